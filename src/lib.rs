//! Spiral Walker - a map marker that walks an outward spiral
//!
//! Core modules:
//! - `sim`: Spiral geometry, water avoidance, event scheduling, frame tick
//! - `geo`: Geographic points, bounding boxes, Web-Mercator viewport
//! - `geodata`: Overpass query/response handling and GeoJSON parsing
//! - `render`: Per-frame output for the host renderer
//! - `settings`: Configuration snapshot and partial updates

pub mod error;
pub mod geo;
pub mod geodata;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::{FetchError, GeometryError};
pub use crate::geo::{BoundingBox, GeoPoint, Projection, WebMercatorViewport};
pub use render::FrameOutput;
pub use settings::{Config, ConfigPatch, EventToggles};
pub use sim::Session;

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Spiral parameter advance per second at speed factor 1.0
    pub const SPIRAL_RATE: f64 = 1.4;

    /// Candidates tested along the spiral, the wet ideal point included
    pub const MAX_AVOID_ATTEMPTS: u32 = 40;
    /// Spiral parameter step per avoidance probe
    pub const AVOID_STEP: f64 = 0.25;

    /// Event delay jitter: delay = base * (JITTER_MIN + u * JITTER_SPAN)
    pub const EVENT_JITTER_MIN: f64 = 0.7;
    pub const EVENT_JITTER_SPAN: f64 = 0.6;

    /// Spiral trace sampling step (radians of t)
    pub const TRACE_STEP: f64 = 0.2;

    /// Companion sprite offset from the marker while an event plays (pixels)
    pub const COMPANION_OFFSET_X: f64 = 70.0;
    pub const COMPANION_OFFSET_Y: f64 = -10.0;

    /// Web-Mercator tile size in pixels
    pub const TILE_SIZE: f64 = 256.0;
    /// Latitude limit of the Web-Mercator projection
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}
