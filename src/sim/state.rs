//! Walker session state
//!
//! Everything that changes from frame to frame lives in one [`Session`]:
//! the spiral parameter, the event scheduler and the current water set.

use crate::error::FetchError;
use crate::geo::{BoundingBox, Projection};
use crate::geodata::{FetchTicket, WaterStatus, overpass};
use crate::render::FrameOutput;
use crate::settings::{Config, ConfigPatch};

use super::events::EventScheduler;
use super::water::PolygonSet;

/// One walker on one map
#[derive(Debug, Clone)]
pub struct Session<P: Projection> {
    pub(crate) projection: P,
    pub(crate) config: Config,
    /// Spiral parameter
    pub(crate) t: f64,
    /// Host timestamp of the previous frame (ms)
    pub(crate) last_timestamp: Option<f64>,
    pub(crate) scheduler: EventScheduler,
    pub(crate) water: PolygonSet,
    water_status: WaterStatus,
    next_ticket: u64,
}

impl<P: Projection> Session<P> {
    /// Create a session; `seed` drives event timing and selection
    pub fn new(projection: P, config: Config, seed: u64) -> Self {
        let scheduler = EventScheduler::new(seed, config.event_frequency_base);
        Self {
            projection,
            config,
            t: 0.0,
            last_timestamp: None,
            scheduler,
            water: PolygonSet::empty(),
            water_status: WaterStatus::Idle,
            next_ticket: 1,
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Viewport access for pan/zoom/resize notifications
    pub fn projection_mut(&mut self) -> &mut P {
        &mut self.projection
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn spiral_t(&self) -> f64 {
        self.t
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn water(&self) -> &PolygonSet {
        &self.water
    }

    pub fn water_status(&self) -> &WaterStatus {
        &self.water_status
    }

    /// Advance one frame
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameOutput {
        super::tick::tick(self, timestamp_ms)
    }

    /// Apply a partial configuration
    ///
    /// A frequency change draws a new event delay. Touching any event
    /// category drops the active event.
    pub fn update_configuration(&mut self, patch: &ConfigPatch) {
        let changes = patch.apply(&mut self.config);
        if changes.frequency {
            self.scheduler.resample_delay(self.config.event_frequency_base);
        }
        if changes.events {
            self.scheduler.clear_active();
        }
    }

    /// Replace the water set outright
    pub fn set_water(&mut self, polygons: PolygonSet) {
        log::info!("Loaded {} water polygons", polygons.len());
        self.water_status = WaterStatus::Loaded(polygons.len());
        self.water = polygons;
    }

    /// Start a water refresh for `bbox`; the host performs the request
    ///
    /// Earlier tickets stay valid. Whichever completes last wins.
    pub fn trigger_refetch(&mut self, bbox: BoundingBox) -> FetchTicket {
        let ticket = FetchTicket::new(self.next_ticket, bbox);
        self.next_ticket += 1;
        self.water_status = WaterStatus::Fetching;
        log::debug!("Water fetch #{} for {}", ticket.id, bbox.to_overpass());
        ticket
    }

    /// Refresh the water set for the current view
    pub fn trigger_refetch_view(&mut self) -> FetchTicket {
        let bbox = self.projection.bounds();
        self.trigger_refetch(bbox)
    }

    /// Finish a refresh; on failure the current set is kept
    pub fn complete_refetch(&mut self, ticket: &FetchTicket, result: Result<PolygonSet, FetchError>) {
        match result {
            Ok(polygons) => self.set_water(polygons),
            Err(err) => {
                log::warn!("Water fetch #{} failed: {}", ticket.id, err);
                self.water_status = WaterStatus::Failed;
            }
        }
    }

    /// Finish a refresh from a raw Overpass response body
    pub fn complete_refetch_overpass(&mut self, ticket: &FetchTicket, body: Result<String, FetchError>) {
        let result = body.and_then(|body| overpass::parse_response(&body));
        self.complete_refetch(ticket, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPoint, WebMercatorViewport};
    use crate::settings::EventToggles;
    use crate::sim::events::EventKind;
    use crate::sim::water::WaterGeometry;
    use glam::DVec2;

    fn session() -> Session<WebMercatorViewport> {
        let viewport = WebMercatorViewport::new(GeoPoint::new(40.7128, -74.006), 12.0, 800.0, 600.0);
        Session::new(viewport, Config::default(), 42)
    }

    fn lake() -> PolygonSet {
        PolygonSet::new(vec![WaterGeometry::from_outer([
            DVec2::new(-74.1, 40.6),
            DVec2::new(-73.9, 40.6),
            DVec2::new(-73.9, 40.8),
        ])])
    }

    #[test]
    fn test_failed_fetch_keeps_water() {
        let mut s = session();
        let first = s.trigger_refetch_view();
        s.complete_refetch(&first, Ok(lake()));
        assert_eq!(s.water().len(), 1);

        let second = s.trigger_refetch_view();
        assert_eq!(s.water_status(), &WaterStatus::Fetching);
        s.complete_refetch(&second, Err(FetchError::Status(504)));
        assert_eq!(s.water().len(), 1);
        assert_eq!(s.water_status(), &WaterStatus::Failed);
    }

    #[test]
    fn test_last_completion_wins() {
        let mut s = session();
        let slow = s.trigger_refetch_view();
        let fast = s.trigger_refetch_view();
        assert_ne!(slow.id, fast.id);

        s.complete_refetch(&fast, Ok(lake()));
        s.complete_refetch(&slow, Ok(PolygonSet::empty()));
        assert!(s.water().is_empty());
        assert_eq!(s.water_status(), &WaterStatus::Loaded(0));
    }

    #[test]
    fn test_overpass_body_parse_failure_keeps_water() {
        let mut s = session();
        s.set_water(lake());
        let ticket = s.trigger_refetch_view();
        s.complete_refetch_overpass(&ticket, Ok("not json".to_string()));
        assert_eq!(s.water().len(), 1);
        assert_eq!(s.water_status(), &WaterStatus::Failed);
    }

    #[test]
    fn test_frequency_change_resamples() {
        let mut s = session();
        s.update_configuration(&ConfigPatch {
            event_frequency_base: Some(100.0),
            ..Default::default()
        });
        let delay = s.scheduler().next_delay();
        assert!((70.0..=130.0).contains(&delay));
    }

    #[test]
    fn test_toggle_change_clears_event() {
        let mut s = session();
        s.update_configuration(&ConfigPatch {
            event_frequency_base: Some(0.0),
            ..Default::default()
        });
        s.config.enabled_events = EventToggles::only(EventKind::Picnic);
        s.tick(0.0);
        assert_eq!(s.scheduler().active(), Some(EventKind::Picnic));

        s.update_configuration(&ConfigPatch {
            chat: Some(true),
            ..Default::default()
        });
        assert!(s.scheduler().active().is_none());
    }
}
