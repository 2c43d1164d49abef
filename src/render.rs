//! Frame output for the host renderer
//!
//! The simulation never paints; it hands the host a [`FrameOutput`] each tick
//! and, when tracing is on, a polyline of the spiral.

use glam::DVec2;
use serde::Serialize;

use crate::consts::{COMPANION_OFFSET_X, COMPANION_OFFSET_Y, TRACE_STEP};
use crate::geo::GeoPoint;
use crate::sim::events::EventKind;
use crate::sim::spiral::spiral_offset;

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOutput {
    /// Marker position in container pixels
    pub marker_pixel: DVec2,
    pub marker_geo: GeoPoint,
    /// Marker is in water (scuba sprite)
    pub submerged: bool,
    pub spiral_trace_enabled: bool,
    pub sprite_size: f64,
    pub active_event_label: Option<&'static str>,
    pub active_event_category: Option<EventKind>,
    /// Companion sprite position while an event is showing
    pub companion_pixel: Option<DVec2>,
    /// Chat companion swims alongside a submerged marker
    pub companion_in_water: bool,
    /// Movement frozen by an event
    pub paused: bool,
}

/// Companion sprite position next to the marker
#[inline]
pub fn companion_position(marker_pixel: DVec2) -> DVec2 {
    marker_pixel + DVec2::new(COMPANION_OFFSET_X, COMPANION_OFFSET_Y)
}

/// Sample the spiral around `center_px` far enough to cover a `width` x
/// `height` view
///
/// The parameter runs from 0 in `TRACE_STEP` increments while below
/// `2 * max(width, height)`.
pub fn spiral_trace(center_px: DVec2, spacing: f64, width: f64, height: f64) -> Vec<DVec2> {
    let limit = 2.0 * width.max(height);
    if !limit.is_finite() || limit <= 0.0 {
        return Vec::new();
    }
    let samples = (limit / TRACE_STEP).ceil() as usize;
    (0..samples)
        .map(|i| i as f64 * TRACE_STEP)
        .take_while(|t| *t < limit)
        .map(|t| center_px + spiral_offset(t, spacing))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_starts_at_center() {
        let center = DVec2::new(400.0, 300.0);
        let trace = spiral_trace(center, 40.0, 800.0, 600.0);
        assert_eq!(trace[0], center);
        assert_eq!(trace.len(), 8000);
    }

    #[test]
    fn test_trace_empty_for_empty_view() {
        assert!(spiral_trace(DVec2::ZERO, 40.0, 0.0, 0.0).is_empty());
        assert!(spiral_trace(DVec2::ZERO, 40.0, f64::NAN, f64::NAN).is_empty());
    }

    #[test]
    fn test_trace_empty_for_unbounded_view() {
        assert!(spiral_trace(DVec2::ZERO, 40.0, f64::INFINITY, 600.0).is_empty());
    }

    #[test]
    fn test_companion_offset() {
        assert_eq!(companion_position(DVec2::new(100.0, 100.0)), DVec2::new(170.0, 90.0));
    }
}
