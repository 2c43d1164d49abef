//! Water geometry acquisition
//!
//! The crate does not own a network stack. A refresh is a [`FetchTicket`]
//! handed to the host, which POSTs [`FetchTicket::query`] to
//! [`OVERPASS_URL`] and reports back through `Session::complete_refetch*`.

pub mod geojson;
pub mod overpass;

use crate::geo::BoundingBox;

/// Public Overpass API interpreter endpoint
pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// An in-flight water refresh
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub id: u64,
    /// Overpass QL request body
    pub query: String,
}

impl FetchTicket {
    pub fn new(id: u64, bbox: BoundingBox) -> Self {
        Self {
            id,
            query: overpass::build_query(&bbox),
        }
    }
}

/// Water data state shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaterStatus {
    #[default]
    Idle,
    Fetching,
    Loaded(usize),
    Failed,
}

impl WaterStatus {
    pub fn message(&self) -> String {
        match self {
            WaterStatus::Idle => String::new(),
            WaterStatus::Fetching => "Fetching water polygons…".to_string(),
            WaterStatus::Loaded(count) => format!("Loaded {} water polygons.", count),
            WaterStatus::Failed => "Could not load water data. Try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(WaterStatus::Loaded(3).message(), "Loaded 3 water polygons.");
        assert_eq!(WaterStatus::Failed.message(), "Could not load water data. Try again.");
        assert!(WaterStatus::Idle.message().is_empty());
    }

    #[test]
    fn test_ticket_carries_query() {
        let ticket = FetchTicket::new(7, BoundingBox::new(40.6, -74.1, 40.8, -73.9));
        assert_eq!(ticket.id, 7);
        assert!(ticket.query.contains("40.6,-74.1,40.8,-73.9"));
    }
}
