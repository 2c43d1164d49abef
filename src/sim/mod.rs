//! Walker simulation
//!
//! All movement and event logic lives here. Nothing in this module paints or
//! touches the network:
//! - Seeded RNG only
//! - Host timestamps in, frame descriptions out
//! - Water data is swapped in whole, never edited

pub mod events;
pub mod planner;
pub mod spiral;
pub mod state;
pub mod tick;
pub mod water;

pub use events::{EventKind, EventScheduler, sample_event_delay};
pub use planner::{Resolved, resolve_position};
pub use spiral::spiral_offset;
pub use state::Session;
pub use tick::tick;
pub use water::{PolygonSet, WaterGeometry, point_in_water};
