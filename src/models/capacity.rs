//! Capacity records owned by the Capacity Ledger.
//!
//! The central invariant of the whole engine lives here:
//! `0 <= booked_count <= capacity`, at all times, including transiently
//! during concurrent updates. Records are mutated only through the ledger's
//! reserve/release operations, never assigned directly.

use serde::{Deserialize, Serialize};

/// Per-event seat accounting, the sole point of truth for "is there room"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityRecord {
    pub event_id: String,
    /// Fixed at event creation; admin edits go through the ledger
    pub capacity: u32,
    pub booked_count: u32,
}

impl CapacityRecord {
    /// Create a fresh record with no seats booked
    pub fn new(event_id: impl Into<String>, capacity: u32) -> Self {
        Self {
            event_id: event_id.into(),
            capacity,
            booked_count: 0,
        }
    }

    /// Remaining seats for this event
    pub fn spots_left(&self) -> u32 {
        self.capacity - self.booked_count
    }

    /// Whether another seat can be booked
    pub fn has_room(&self) -> bool {
        self.booked_count < self.capacity
    }

    /// Snapshot of the counters for display and broadcast
    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            booked_count: self.booked_count,
            capacity: self.capacity,
        }
    }
}

/// Point-in-time view of an event's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub booked_count: u32,
    pub capacity: u32,
}

impl Occupancy {
    pub fn spots_left(&self) -> u32 {
        self.capacity - self.booked_count
    }

    pub fn is_sold_out(&self) -> bool {
        self.booked_count >= self.capacity
    }
}
