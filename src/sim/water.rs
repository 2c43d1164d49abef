//! Water polygons and point containment
//!
//! Coordinates are stored GeoJSON style: `x` = longitude, `y` = latitude.
//! Rings are closed on construction, so an open ring from the data source
//! is accepted as long as it still has enough positions.

use ::geo::{Coord, Intersects, LineString, MultiPolygon, Point, Polygon};
use glam::DVec2;

use crate::error::GeometryError;
use crate::geo::GeoPoint;

/// Ring through `points`; `Polygon::new` closes it
pub fn ring(points: impl IntoIterator<Item = DVec2>) -> LineString<f64> {
    points.into_iter().map(|p| Coord { x: p.x, y: p.y }).collect()
}

/// Check that a polygon can take part in containment tests
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<(), GeometryError> {
    if polygon.exterior().0.is_empty() {
        return Err(GeometryError::NoRings);
    }
    let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
    for (ring, line) in rings.enumerate() {
        if line.0.len() < 4 {
            return Err(GeometryError::RingTooShort {
                ring,
                len: line.0.len(),
            });
        }
        if line.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryError::NonFinite { ring });
        }
    }
    Ok(())
}

/// A water feature geometry
#[derive(Debug, Clone, PartialEq)]
pub enum WaterGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl WaterGeometry {
    /// Polygon with a single outer ring and no holes
    pub fn from_outer(outer: impl IntoIterator<Item = DVec2>) -> Self {
        WaterGeometry::Polygon(Polygon::new(ring(outer), vec![]))
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            WaterGeometry::Polygon(polygon) => validate_polygon(polygon),
            WaterGeometry::MultiPolygon(parts) => parts.iter().try_for_each(validate_polygon),
        }
    }

    /// Containment with the boundary counted as inside
    ///
    /// A point on a hole's edge is still inside. A malformed multipolygon
    /// part fails the whole geometry.
    pub fn contains(&self, point: DVec2) -> Result<bool, GeometryError> {
        self.validate()?;
        let point = Point::new(point.x, point.y);
        Ok(match self {
            WaterGeometry::Polygon(polygon) => polygon.intersects(&point),
            WaterGeometry::MultiPolygon(parts) => parts.intersects(&point),
        })
    }
}

/// Ordered set of water geometries, replaced wholesale on refresh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonSet {
    geometries: Vec<WaterGeometry>,
}

impl PolygonSet {
    pub fn new(geometries: Vec<WaterGeometry>) -> Self {
        let malformed = geometries.iter().filter(|g| g.validate().is_err()).count();
        if malformed > 0 {
            log::warn!(
                "{} of {} water geometries are malformed and will be ignored",
                malformed,
                geometries.len()
            );
        }
        Self { geometries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaterGeometry> {
        self.geometries.iter()
    }
}

/// True iff the point lies inside any water geometry
///
/// Geometries that fail validation are skipped; the rest still count.
pub fn point_in_water(point: GeoPoint, polygons: &PolygonSet) -> bool {
    if polygons.is_empty() {
        return false;
    }
    let xy = point.as_xy();
    for (index, geometry) in polygons.iter().enumerate() {
        match geometry.contains(xy) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(err) => log::debug!("Skipping water geometry {}: {}", index, err),
        }
    }
    false
}
