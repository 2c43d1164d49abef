//! Walker configuration
//!
//! The host owns the controls; the simulation only sees an immutable
//! [`Config`] snapshot, updated through [`ConfigPatch`] (partial JSON in the
//! wasm build).

use serde::{Deserialize, Serialize};

use crate::sim::events::EventKind;

/// Which event categories may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventToggles {
    pub picnic: bool,
    pub monster: bool,
    pub chat: bool,
}

impl Default for EventToggles {
    fn default() -> Self {
        Self {
            picnic: true,
            monster: true,
            chat: true,
        }
    }
}

impl EventToggles {
    pub fn none() -> Self {
        Self {
            picnic: false,
            monster: false,
            chat: false,
        }
    }

    pub fn only(kind: EventKind) -> Self {
        let mut toggles = Self::none();
        toggles.set(kind, true);
        toggles
    }

    pub fn is_enabled(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Picnic => self.picnic,
            EventKind::Monster => self.monster,
            EventKind::Chat => self.chat,
        }
    }

    pub fn set(&mut self, kind: EventKind, enabled: bool) {
        match kind {
            EventKind::Picnic => self.picnic = enabled,
            EventKind::Monster => self.monster = enabled,
            EventKind::Chat => self.chat = enabled,
        }
    }

    /// Enabled kinds in catalog order
    pub fn enabled(&self) -> Vec<EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

/// Per-frame configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Distance between spiral turns (pixels)
    pub spacing: f64,
    /// Travel speed multiplier
    pub speed_factor: f64,
    /// Draw the spiral path behind the marker
    pub draw_spiral: bool,
    /// Marker sprite edge length (pixels)
    pub sprite_size: f64,
    /// Walk straight through water instead of steering around it
    pub allow_water_crossing: bool,
    /// Mean seconds of travel between events
    pub event_frequency_base: f64,
    pub enabled_events: EventToggles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spacing: 40.0,
            speed_factor: 1.0,
            draw_spiral: true,
            sprite_size: 42.0,
            allow_water_crossing: false,
            event_frequency_base: 10.0,
            enabled_events: EventToggles::default(),
        }
    }
}

/// A partial configuration update; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub spacing: Option<f64>,
    pub speed_factor: Option<f64>,
    pub draw_spiral: Option<bool>,
    pub sprite_size: Option<f64>,
    pub allow_water_crossing: Option<bool>,
    pub event_frequency_base: Option<f64>,
    pub picnic: Option<bool>,
    pub monster: Option<bool>,
    pub chat: Option<bool>,
}

/// What a patch touched that the scheduler cares about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    /// Frequency input fired (even with the same value)
    pub frequency: bool,
    /// A category toggle fired
    pub events: bool,
}

impl ConfigPatch {
    /// Apply onto `config`, reporting which inputs fired
    pub fn apply(&self, config: &mut Config) -> ConfigChanges {
        if let Some(v) = self.spacing {
            config.spacing = v;
        }
        if let Some(v) = self.speed_factor {
            config.speed_factor = v;
        }
        if let Some(v) = self.draw_spiral {
            config.draw_spiral = v;
        }
        if let Some(v) = self.sprite_size {
            config.sprite_size = v;
        }
        if let Some(v) = self.allow_water_crossing {
            config.allow_water_crossing = v;
        }
        if let Some(v) = self.event_frequency_base {
            config.event_frequency_base = v;
        }

        let mut events = false;
        for (kind, toggle) in [
            (EventKind::Picnic, self.picnic),
            (EventKind::Monster, self.monster),
            (EventKind::Chat, self.chat),
        ] {
            if let Some(enabled) = toggle {
                config.enabled_events.set(kind, enabled);
                events = true;
            }
        }

        ConfigChanges {
            frequency: self.event_frequency_base.is_some(),
            events,
        }
    }
}
