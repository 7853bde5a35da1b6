//! Event catalog display types.
//!
//! The Event Catalog owns this metadata; the engine only reads it to
//! validate existence and to populate booking responses. Occupancy counters
//! are deliberately absent from [`EventSummary`]: the Capacity Ledger is
//! the single authority for those.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capacity::Occupancy;

/// Category labels used by the event catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Concert,
    Conference,
    Exhibition,
    Sports,
    Theater,
    Workshop,
    Other,
}

/// Event metadata as the catalog exposes it (no occupancy counters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub category: EventCategory,
    pub price: f64,
    pub image: String,
}

/// Event metadata joined with live occupancy, as returned to booking clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub summary: EventSummary,
    pub booked_count: u32,
    pub capacity: u32,
}

impl EventDetail {
    /// Join catalog metadata with the ledger's current counters
    pub fn from_parts(summary: EventSummary, occupancy: Occupancy) -> Self {
        Self {
            summary,
            booked_count: occupancy.booked_count,
            capacity: occupancy.capacity,
        }
    }

    /// Remaining seats for this event
    pub fn spots_left(&self) -> u32 {
        self.capacity - self.booked_count
    }
}
