//! Geographic primitives and the projection seam
//!
//! The planner only ever talks to a [`Projection`]; the Web-Mercator
//! viewport is one implementation of it.

pub mod viewport;

pub use viewport::WebMercatorViewport;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON position order (x = longitude, y = latitude)
    #[inline]
    pub fn as_xy(&self) -> DVec2 {
        DVec2::new(self.lng, self.lat)
    }
}

/// An axis-aligned geographic box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Box spanning two corner points in any order
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            south: a.lat.min(b.lat),
            west: a.lng.min(b.lng),
            north: a.lat.max(b.lat),
            east: a.lng.max(b.lng),
        }
    }

    /// `south,west,north,east`, the order Overpass QL expects
    pub fn to_overpass(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

/// Conversion between geographic coordinates and layer pixels
///
/// Layer pixels are a flat space anchored to the current view where spiral
/// offsets are applied.
pub trait Projection {
    /// Geographic point to layer pixel
    fn project(&self, point: GeoPoint) -> DVec2;

    /// Layer pixel to geographic point
    fn unproject(&self, pixel: DVec2) -> GeoPoint;

    /// Geographic center of the current view
    fn center(&self) -> GeoPoint;

    /// Geographic extent of the current view
    fn bounds(&self) -> BoundingBox;

    /// Layer pixel to on-screen container pixel
    fn to_container(&self, layer: DVec2) -> DVec2 {
        layer
    }
}
