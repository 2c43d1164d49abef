//! Per-frame driver
//!
//! Called once per host animation frame with a monotonically increasing
//! timestamp in milliseconds.

use super::events::EventKind;
use super::planner::resolve_position;
use super::state::Session;
use super::water::point_in_water;
use crate::consts::SPIRAL_RATE;
use crate::geo::Projection;
use crate::render::{FrameOutput, companion_position};

/// Advance the session to `timestamp_ms` and describe the frame
///
/// While an event pause is open the elapsed time counts as zero, so neither
/// the spiral nor the travel clock moves.
pub fn tick<P: Projection>(session: &mut Session<P>, timestamp_ms: f64) -> FrameOutput {
    let paused = session.scheduler.is_paused(timestamp_ms);
    let delta = match session.last_timestamp {
        Some(last) if !paused => elapsed_seconds(last, timestamp_ms),
        _ => 0.0,
    };
    session.last_timestamp = Some(timestamp_ms);

    let config = &session.config;
    let advance = delta * config.speed_factor * SPIRAL_RATE;
    if advance.is_finite() {
        session.t += advance;
    }
    if !paused {
        session.scheduler.accumulate(delta);
    }

    let center = session.projection.center();
    let resolved = resolve_position(
        &session.projection,
        center,
        session.t,
        config.spacing,
        &session.water,
        config.allow_water_crossing,
    );
    session.t = resolved.t;

    let enabled = config.enabled_events.enabled();
    session
        .scheduler
        .update(timestamp_ms, &enabled, config.event_frequency_base);

    let marker_pixel = session
        .projection
        .to_container(session.projection.project(resolved.position));
    let active = session.scheduler.active();
    let companion_in_water =
        active == Some(EventKind::Chat) && point_in_water(resolved.position, &session.water);

    FrameOutput {
        marker_pixel,
        marker_geo: resolved.position,
        submerged: resolved.submerged,
        spiral_trace_enabled: config.draw_spiral,
        sprite_size: config.sprite_size,
        active_event_label: active.map(|kind| kind.label()),
        active_event_category: active,
        companion_pixel: active.map(|_| companion_position(marker_pixel)),
        companion_in_water,
        paused: session.scheduler.is_paused(timestamp_ms),
    }
}

/// Seconds between two host timestamps; clock skew counts as no time
fn elapsed_seconds(last_ms: f64, now_ms: f64) -> f64 {
    let delta = (now_ms - last_ms) / 1000.0;
    if delta.is_finite() && delta > 0.0 { delta } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{BoundingBox, GeoPoint, WebMercatorViewport};
    use crate::settings::{Config, ConfigPatch, EventToggles};
    use crate::sim::spiral::spiral_offset;
    use crate::sim::water::{PolygonSet, WaterGeometry};
    use glam::DVec2;

    fn viewport() -> WebMercatorViewport {
        WebMercatorViewport::new(GeoPoint::new(40.7128, -74.006), 12.0, 800.0, 600.0)
    }

    fn quiet_config() -> Config {
        Config {
            enabled_events: EventToggles::none(),
            ..Config::default()
        }
    }

    #[test]
    fn test_one_second_of_travel() {
        let mut session = Session::new(viewport(), quiet_config(), 1);
        session.tick(0.0);
        let frame = session.tick(1000.0);

        assert!((session.spiral_t() - 1.4).abs() < 1e-9);
        let center = session.projection().project(session.projection().center());
        let offset = session.projection().project(frame.marker_geo) - center;
        let expected = spiral_offset(1.4, 40.0);
        assert!((offset - expected).length() < 1e-6);
        assert!(!frame.submerged);
    }

    #[test]
    fn test_first_frame_does_not_jump() {
        let mut session = Session::new(viewport(), quiet_config(), 1);
        session.tick(123_456.0);
        assert_eq!(session.spiral_t(), 0.0);
    }

    #[test]
    fn test_speed_factor_scales_progress() {
        let mut session = Session::new(
            viewport(),
            Config {
                speed_factor: 2.5,
                ..quiet_config()
            },
            1,
        );
        session.tick(0.0);
        session.tick(500.0);
        assert!((session.spiral_t() - 0.5 * 2.5 * 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_speed_does_not_wedge_spiral() {
        let mut session = Session::new(viewport(), quiet_config(), 1);
        session.tick(0.0);
        session.update_configuration(&ConfigPatch {
            speed_factor: Some(f64::NAN),
            ..Default::default()
        });
        let frame = session.tick(16.0);
        assert_eq!(session.spiral_t(), 0.0);
        assert!(frame.marker_pixel.is_finite());

        session.update_configuration(&ConfigPatch {
            speed_factor: Some(1.0),
            ..Default::default()
        });
        session.tick(1016.0);
        assert!((session.spiral_t() - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_event_pauses_motion() {
        let mut session = Session::new(
            viewport(),
            Config {
                event_frequency_base: 1.0,
                enabled_events: EventToggles::only(EventKind::Monster),
                ..Config::default()
            },
            8,
        );
        session.tick(0.0);
        let mut now = 0.0;
        let mut started_at = None;
        while started_at.is_none() && now < 5000.0 {
            now += 100.0;
            let frame = session.tick(now);
            if frame.active_event_category.is_some() {
                started_at = Some(now);
                assert_eq!(frame.active_event_label, Some(EventKind::Monster.label()));
                assert!(frame.paused);
                assert!(frame.companion_pixel.is_some());
            }
        }
        let started_at = started_at.expect("event should fire within 1.3s of travel");
        let t_at_start = session.spiral_t();

        let frame = session.tick(started_at + 1500.0);
        assert_eq!(session.spiral_t(), t_at_start);
        assert_eq!(session.scheduler().travel_clock(), 0.0);
        assert!(frame.paused);

        session.tick(started_at + 2990.0);
        let frame = session.tick(started_at + 3000.0);
        assert!(frame.active_event_category.is_none());
        assert!(!frame.paused);

        session.tick(started_at + 3100.0);
        assert!(session.spiral_t() > t_at_start);
    }

    #[test]
    fn test_disable_all_while_active() {
        let mut session = Session::new(
            viewport(),
            Config {
                event_frequency_base: 0.0,
                enabled_events: EventToggles::only(EventKind::Chat),
                ..Config::default()
            },
            2,
        );
        let frame = session.tick(0.0);
        assert_eq!(frame.active_event_category, Some(EventKind::Chat));

        session.config.enabled_events = EventToggles::none();
        let frame = session.tick(16.0);
        assert!(frame.active_event_category.is_none());
        assert!(frame.active_event_label.is_none());
    }

    #[test]
    fn test_water_crossing_marks_submerged() {
        let vp = viewport();
        let bounds: BoundingBox = vp.bounds();
        let flood = PolygonSet::new(vec![WaterGeometry::from_outer([
            DVec2::new(bounds.west - 1.0, bounds.south - 1.0),
            DVec2::new(bounds.east + 1.0, bounds.south - 1.0),
            DVec2::new(bounds.east + 1.0, bounds.north + 1.0),
            DVec2::new(bounds.west - 1.0, bounds.north + 1.0),
        ])]);

        let mut session = Session::new(vp, quiet_config(), 1);
        session.set_water(flood);
        session.tick(0.0);
        let frame = session.tick(1000.0);
        assert!(frame.submerged);
        assert!((session.spiral_t() - 1.4).abs() < 1e-9);

        session.update_configuration(&ConfigPatch {
            allow_water_crossing: Some(true),
            ..Default::default()
        });
        let frame = session.tick(2000.0);
        assert!(frame.submerged);
        assert!((session.spiral_t() - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_chat_companion_swims() {
        let vp = viewport();
        let bounds = vp.bounds();
        let flood = PolygonSet::new(vec![WaterGeometry::from_outer([
            DVec2::new(bounds.west, bounds.south),
            DVec2::new(bounds.east, bounds.south),
            DVec2::new(bounds.east, bounds.north),
            DVec2::new(bounds.west, bounds.north),
        ])]);
        let mut session = Session::new(
            vp,
            Config {
                allow_water_crossing: true,
                event_frequency_base: 0.0,
                enabled_events: EventToggles::only(EventKind::Chat),
                ..Config::default()
            },
            4,
        );
        session.set_water(flood);
        let frame = session.tick(0.0);
        assert_eq!(frame.active_event_category, Some(EventKind::Chat));
        assert!(frame.companion_in_water);
    }

    #[test]
    fn test_elapsed_ignores_backwards_time() {
        assert_eq!(elapsed_seconds(1000.0, 500.0), 0.0);
        assert_eq!(elapsed_seconds(0.0, f64::NAN), 0.0);
        assert_eq!(elapsed_seconds(0.0, 250.0), 0.25);
    }
}
