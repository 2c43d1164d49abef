//! Random travel events
//!
//! After enough unpaused travel the walker stops for one event (picnic,
//! monster, chat). Only one event is active at a time, and movement pauses
//! until it ends.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{EVENT_JITTER_MIN, EVENT_JITTER_SPAN};

/// Event categories, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Picnic,
    Monster,
    Chat,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Picnic, EventKind::Monster, EventKind::Chat];

    pub fn id(&self) -> &'static str {
        match self {
            EventKind::Picnic => "picnic",
            EventKind::Monster => "monster",
            EventKind::Chat => "chat",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Picnic => "Picnic stop: unpacks a blanket and snacks.",
            EventKind::Monster => "Monster encounter: cautious standoff.",
            EventKind::Chat => "Chat break: catches up with a friend.",
        }
    }

    /// How long the walker stays stopped (milliseconds)
    pub fn duration_ms(&self) -> f64 {
        match self {
            EventKind::Picnic => 3500.0,
            EventKind::Monster => 3000.0,
            EventKind::Chat => 3000.0,
        }
    }
}

/// Draw the travel time before the next event: `base * [0.7, 1.3]`
pub fn sample_event_delay<R: Rng + ?Sized>(rng: &mut R, base: f64) -> f64 {
    base * (EVENT_JITTER_MIN + rng.random::<f64>() * EVENT_JITTER_SPAN)
}

/// Event timer and the single active-event slot
///
/// Timestamps are host frame times in milliseconds; the travel clock and
/// delays are in seconds.
#[derive(Debug, Clone)]
pub struct EventScheduler {
    active: Option<EventKind>,
    /// End of the current (or last) event
    event_end_ms: f64,
    /// Movement is frozen before this time
    pause_end_ms: f64,
    /// Unpaused travel since the last event (seconds)
    travel_clock: f64,
    /// Travel needed before the next event (seconds)
    next_delay: f64,
    rng: Pcg32,
}

impl EventScheduler {
    pub fn new(seed: u64, frequency_base: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_delay = sample_event_delay(&mut rng, frequency_base);
        Self {
            active: None,
            event_end_ms: 0.0,
            pause_end_ms: 0.0,
            travel_clock: 0.0,
            next_delay,
            rng,
        }
    }

    pub fn active(&self) -> Option<EventKind> {
        self.active
    }

    pub fn travel_clock(&self) -> f64 {
        self.travel_clock
    }

    pub fn next_delay(&self) -> f64 {
        self.next_delay
    }

    pub fn event_end_ms(&self) -> f64 {
        self.event_end_ms
    }

    pub fn pause_end_ms(&self) -> f64 {
        self.pause_end_ms
    }

    pub fn is_paused(&self, now_ms: f64) -> bool {
        now_ms < self.pause_end_ms
    }

    /// Add unpaused travel time
    pub fn accumulate(&mut self, seconds: f64) {
        self.travel_clock += seconds;
    }

    /// Draw a fresh delay (frequency input changed)
    pub fn resample_delay(&mut self, frequency_base: f64) {
        self.next_delay = sample_event_delay(&mut self.rng, frequency_base);
        log::debug!("Next event after {:.1}s of travel", self.next_delay);
    }

    /// Drop the active event without touching the timers
    pub fn clear_active(&mut self) {
        if let Some(kind) = self.active.take() {
            log::debug!("Event {} cleared", kind.id());
        }
    }

    /// Run the frame's transitions; returns an event that just started
    ///
    /// `enabled` must be in catalog order for seeded runs to reproduce.
    pub fn update(&mut self, now_ms: f64, enabled: &[EventKind], frequency_base: f64) -> Option<EventKind> {
        if enabled.is_empty() {
            self.clear_active();
        }

        let mut started = None;
        if !enabled.is_empty() && now_ms >= self.event_end_ms && self.travel_clock >= self.next_delay {
            let kind = enabled[self.rng.random_range(0..enabled.len())];
            self.active = Some(kind);
            self.event_end_ms = now_ms + kind.duration_ms();
            self.pause_end_ms = self.pause_end_ms.max(self.event_end_ms);
            self.travel_clock = 0.0;
            self.resample_delay(frequency_base);
            log::info!("Event started: {} ({}ms)", kind.id(), kind.duration_ms());
            started = Some(kind);
        }

        if self.active.is_some() && now_ms >= self.event_end_ms {
            self.clear_active();
        }

        started
    }
}
