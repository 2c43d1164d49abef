//! Water-avoiding position planner
//!
//! The marker wants to sit at the spiral point for the current parameter. If
//! that point is wet, the planner walks forward along the spiral in small
//! steps looking for dry land, giving up after a fixed number of probes.

use glam::DVec2;

use super::spiral::spiral_offset;
use super::water::{PolygonSet, point_in_water};
use crate::consts::{AVOID_STEP, MAX_AVOID_ATTEMPTS};
use crate::geo::{GeoPoint, Projection};

/// Outcome of one planning step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// Where the marker goes
    pub position: GeoPoint,
    /// Spiral parameter to carry into the next frame
    pub t: f64,
    /// Marker ended up in water
    pub submerged: bool,
}

/// Geographic point of spiral parameter `t` around `center_px`
fn candidate<P: Projection + ?Sized>(projection: &P, center_px: DVec2, t: f64, spacing: f64) -> GeoPoint {
    projection.unproject(center_px + spiral_offset(t, spacing))
}

/// Pick the marker position for spiral parameter `t`
///
/// With `allow_water` the ideal point is always used and `submerged` only
/// reports where it landed. Otherwise `MAX_AVOID_ATTEMPTS` candidates are
/// tested at `t + k * AVOID_STEP` for `k` in `0..MAX_AVOID_ATTEMPTS`, the ideal
/// point being attempt 0. If none is dry the ideal point is kept and marked
/// submerged, with `t` unchanged.
pub fn resolve_position<P: Projection + ?Sized>(
    projection: &P,
    center: GeoPoint,
    t: f64,
    spacing: f64,
    polygons: &PolygonSet,
    allow_water: bool,
) -> Resolved {
    let center_px = projection.project(center);
    let ideal = candidate(projection, center_px, t, spacing);
    let ideal_wet = point_in_water(ideal, polygons);

    if allow_water || !ideal_wet {
        return Resolved {
            position: ideal,
            t,
            submerged: ideal_wet,
        };
    }

    for k in 1..MAX_AVOID_ATTEMPTS {
        let probe_t = t + f64::from(k) * AVOID_STEP;
        let position = candidate(projection, center_px, probe_t, spacing);
        if !point_in_water(position, polygons) {
            return Resolved {
                position,
                t: probe_t,
                submerged: false,
            };
        }
    }

    log::trace!("No dry point within {} probes of t={:.2}", MAX_AVOID_ATTEMPTS, t);
    Resolved {
        position: ideal,
        t,
        submerged: true,
    }
}
