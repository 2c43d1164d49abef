//! Overpass API query and response conversion
//!
//! Water areas come back as raw OSM elements: nodes with coordinates, ways
//! listing node ids, and multipolygon relations listing member ways. Closed
//! tagged ways become polygons; relations have their member ways stitched
//! into rings first.

use std::collections::HashMap;

use ::geo::{Intersects, MultiPolygon, Point, Polygon};
use glam::DVec2;
use serde::Deserialize;

use crate::error::FetchError;
use crate::geo::BoundingBox;
use crate::sim::water::{PolygonSet, WaterGeometry, ring};

/// Overpass QL for every water area inside `bbox`
pub fn build_query(bbox: &BoundingBox) -> String {
    let b = bbox.to_overpass();
    format!(
        "[out:json][timeout:25];\n\
         (\n  \
           way[\"natural\"=\"water\"]({b});\n  \
           relation[\"natural\"=\"water\"]({b});\n  \
           way[\"waterway\"=\"riverbank\"]({b});\n  \
           relation[\"waterway\"=\"riverbank\"]({b});\n  \
           way[\"landuse\"=\"reservoir\"]({b});\n\
         );\n\
         out body;\n\
         >;\n\
         out skel qt;\n"
    )
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "ref")]
    id: i64,
    #[serde(default)]
    role: String,
}

/// Parse an Overpass JSON body into water geometries
pub fn parse_response(body: &str) -> Result<PolygonSet, FetchError> {
    let response: Response = serde_json::from_str(body)?;
    Ok(convert(response.elements))
}

fn convert(elements: Vec<Element>) -> PolygonSet {
    let mut nodes = HashMap::new();
    let mut ways = HashMap::new();
    let mut tagged_ways = Vec::new();
    let mut relations = Vec::new();

    for element in elements {
        match element {
            Element::Node { id, lat, lon } => {
                nodes.insert(id, DVec2::new(lon, lat));
            }
            Element::Way { id, nodes: refs, tags } => {
                if !tags.is_empty() {
                    tagged_ways.push(id);
                }
                ways.insert(id, refs);
            }
            Element::Relation { id, members, tags } => {
                if tags.get("type").map(String::as_str) == Some("multipolygon") {
                    relations.push((id, members));
                }
            }
            Element::Other => {}
        }
    }

    let mut geometries = Vec::new();

    for id in tagged_ways {
        let refs = &ways[&id];
        if refs.len() < 4 || refs.first() != refs.last() {
            log::debug!("Way {} is not a closed area, skipping", id);
            continue;
        }
        match resolve_ring(refs, &nodes) {
            Some(outer) => geometries.push(WaterGeometry::from_outer(outer)),
            None => log::debug!("Way {} references missing nodes", id),
        }
    }

    for (id, members) in relations {
        match assemble_relation(&members, &ways, &nodes) {
            Some(geometry) => geometries.push(geometry),
            None => log::debug!("Relation {} has no closed outer ring", id),
        }
    }

    PolygonSet::new(geometries)
}

fn resolve_ring(refs: &[i64], nodes: &HashMap<i64, DVec2>) -> Option<Vec<DVec2>> {
    refs.iter().map(|id| nodes.get(id).copied()).collect()
}

fn assemble_relation(
    members: &[Member],
    ways: &HashMap<i64, Vec<i64>>,
    nodes: &HashMap<i64, DVec2>,
) -> Option<WaterGeometry> {
    let mut outer_ways = Vec::new();
    let mut inner_ways = Vec::new();
    for member in members.iter().filter(|m| m.kind == "way") {
        let Some(refs) = ways.get(&member.id) else {
            continue;
        };
        if member.role == "inner" {
            inner_ways.push(refs.clone());
        } else {
            outer_ways.push(refs.clone());
        }
    }

    let outers: Vec<Vec<DVec2>> = join_rings(outer_ways)
        .iter()
        .filter_map(|refs| resolve_ring(refs, nodes))
        .collect();
    if outers.is_empty() {
        return None;
    }

    let mut polygons: Vec<Polygon<f64>> = outers
        .into_iter()
        .map(|outer| Polygon::new(ring(outer), vec![]))
        .collect();
    for hole in join_rings(inner_ways).iter().filter_map(|refs| resolve_ring(refs, nodes)) {
        let anchor = Point::new(hole[0].x, hole[0].y);
        match polygons.iter_mut().find(|polygon| polygon.intersects(&anchor)) {
            Some(polygon) => polygon.interiors_push(ring(hole)),
            None => log::debug!("Inner ring outside every outer ring, dropped"),
        }
    }

    if polygons.len() == 1 {
        polygons.pop().map(WaterGeometry::Polygon)
    } else {
        Some(WaterGeometry::MultiPolygon(MultiPolygon::new(polygons)))
    }
}

/// Stitch way node lists end-to-end into closed rings
///
/// Segments that never close are dropped.
fn join_rings(mut segments: Vec<Vec<i64>>) -> Vec<Vec<i64>> {
    segments.retain(|s| s.len() >= 2);
    let mut rings = Vec::new();

    while let Some(mut ring) = segments.pop() {
        loop {
            if ring.len() >= 4 && ring.first() == ring.last() {
                rings.push(ring);
                break;
            }
            let Some(&tail) = ring.last() else {
                break;
            };
            let next = segments
                .iter()
                .position(|s| s.first() == Some(&tail) || s.last() == Some(&tail));
            let Some(index) = next else {
                log::debug!("Unclosed ring of {} nodes dropped", ring.len());
                break;
            };
            let mut segment = segments.swap_remove(index);
            if segment.first() != Some(&tail) {
                segment.reverse();
            }
            ring.extend(segment.into_iter().skip(1));
        }
    }

    rings
}
