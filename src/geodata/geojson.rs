//! GeoJSON feature collections
//!
//! For hosts that already convert OSM data themselves. Only `Polygon` and
//! `MultiPolygon` features are kept; everything else is ignored.

use ::geo::{LineString, MultiPolygon, Polygon};
use glam::DVec2;
use serde::Deserialize;

use crate::error::FetchError;
use crate::sim::water::{PolygonSet, WaterGeometry, ring};

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Other,
}

/// Parse a FeatureCollection into water geometries
///
/// A feature whose geometry does not deserialize is skipped, not fatal.
pub fn parse_feature_collection(body: &str) -> Result<PolygonSet, FetchError> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    let mut geometries = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(value) = feature.geometry else {
            continue;
        };
        match serde_json::from_value::<Geometry>(value) {
            Ok(Geometry::Polygon { coordinates }) => {
                geometries.push(WaterGeometry::Polygon(polygon(coordinates)));
            }
            Ok(Geometry::MultiPolygon { coordinates }) => {
                let parts = coordinates.into_iter().map(polygon).collect();
                geometries.push(WaterGeometry::MultiPolygon(MultiPolygon::new(parts)));
            }
            Ok(Geometry::Other) => {}
            Err(err) => log::debug!("Feature {} has unreadable geometry: {}", index, err),
        }
    }

    Ok(PolygonSet::new(geometries))
}

/// First ring is the outer boundary, the rest are holes
fn polygon(rings: Vec<Vec<Position>>) -> Polygon<f64> {
    let mut rings = rings
        .iter()
        .map(|positions| ring(positions.iter().map(|p| position(p))));
    let outer = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(outer, rings.collect())
}

/// Short positions become NaN so validation rejects the ring
fn position(p: &[f64]) -> DVec2 {
    match p {
        [x, y, ..] => DVec2::new(*x, *y),
        _ => DVec2::NAN,
    }
}
