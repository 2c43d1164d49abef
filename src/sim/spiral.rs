//! Archimedean spiral geometry
//!
//! `r(t) = b * t` with `b = spacing / 2π`, so successive turns sit `spacing`
//! pixels apart.

use glam::DVec2;
use std::f64::consts::TAU;

use crate::polar_to_cartesian;

/// Radial growth per radian for a given turn spacing
///
/// Non-finite spacing collapses the spiral to its center.
#[inline]
pub fn growth_rate(spacing: f64) -> f64 {
    if spacing.is_finite() {
        spacing / TAU
    } else {
        0.0
    }
}

/// Pixel offset of spiral parameter `t` from the spiral center
pub fn spiral_offset(t: f64, spacing: f64) -> DVec2 {
    let r = growth_rate(spacing) * t;
    if r == 0.0 || !r.is_finite() {
        return DVec2::ZERO;
    }
    polar_to_cartesian(r, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_at_zero() {
        assert_eq!(spiral_offset(0.0, 40.0), DVec2::ZERO);
    }

    #[test]
    fn test_one_turn_is_spacing() {
        let offset = spiral_offset(TAU, 40.0);
        assert!((offset.x - 40.0).abs() < 1e-9);
        assert!(offset.y.abs() < 1e-9);
    }

    #[test]
    fn test_zero_spacing_collapses() {
        assert_eq!(spiral_offset(12.5, 0.0), DVec2::ZERO);
        assert_eq!(spiral_offset(12.5, f64::NAN), DVec2::ZERO);
    }

    #[test]
    fn test_quarter_turn_direction() {
        let offset = spiral_offset(std::f64::consts::FRAC_PI_2, 40.0);
        assert!(offset.x.abs() < 1e-9);
        assert!((offset.y - 10.0).abs() < 1e-9);
    }
}
