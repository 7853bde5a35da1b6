//! # Capacity Ledger
//!
//! Per-event atomic seat accounting, the sole point of truth for "is there
//! room." The ledger owns every [`CapacityRecord`] and upholds the engine's
//! central invariant, `0 <= booked_count <= capacity`, at all times.
//!
//! ## Key Features
//!
//! - **Atomic check-and-increment**: `try_reserve` evaluates the capacity
//!   bound and bumps the counter in one indivisible step, under the sharded
//!   map's per-entry write lock. There is no window where two callers can
//!   both observe a stale count and both commit; the read-then-save pattern
//!   is structurally impossible through this API.
//! - **Floored release**: `release` decrements but never drives a counter
//!   negative, even if a misbehaving caller releases twice.
//! - **Lock-free reads**: `occupancy` reads skip the exclusive path entirely
//!   and are safe for eventual-consistency display purposes.
//!
//! Records are mutated only through these operations; the struct exposes no
//! direct assignment path.

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::{ReservationError, ReservationResult};
use crate::models::{CapacityRecord, Occupancy};

/// Outcome of an atomic reserve attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryReserve {
    /// Seat taken; carries the new counters
    Reserved(Occupancy),
    /// No room; state left unchanged
    AtCapacity(Occupancy),
    /// No record for this event
    EventNotFound,
}

/// Concurrent map of capacity records keyed by event id
#[derive(Debug, Default)]
pub struct CapacityLedger {
    records: DashMap<String, CapacityRecord>,
}

impl CapacityLedger {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Seed a record for a newly created event.
    ///
    /// Idempotent: an existing record (and its booked count) is left
    /// untouched. Returns whether a record was inserted.
    pub fn register(&self, event_id: &str, capacity: u32) -> bool {
        let mut inserted = false;
        self.records.entry(event_id.to_string()).or_insert_with(|| {
            inserted = true;
            CapacityRecord::new(event_id, capacity)
        });
        if inserted {
            debug!(event_id = event_id, capacity = capacity, "Capacity record registered");
        }
        inserted
    }

    /// Atomically check `booked_count < capacity` and increment on success.
    ///
    /// The entry guard returned by the sharded map holds exclusive access to
    /// the record across both the check and the write.
    pub fn try_reserve(&self, event_id: &str) -> TryReserve {
        match self.records.get_mut(event_id) {
            Some(mut entry) => {
                let record = entry.value_mut();
                if record.has_room() {
                    record.booked_count += 1;
                    TryReserve::Reserved(record.occupancy())
                } else {
                    TryReserve::AtCapacity(record.occupancy())
                }
            }
            None => TryReserve::EventNotFound,
        }
    }

    /// Atomically decrement `booked_count`, floored at zero.
    ///
    /// Returns `None` when no record exists for the event; the cancel path
    /// tolerates events that have since left the catalog.
    pub fn release(&self, event_id: &str) -> Option<Occupancy> {
        match self.records.get_mut(event_id) {
            Some(mut entry) => {
                let record = entry.value_mut();
                if record.booked_count == 0 {
                    warn!(event_id = event_id, "Release called on empty capacity record");
                } else {
                    record.booked_count -= 1;
                }
                Some(record.occupancy())
            }
            None => {
                warn!(event_id = event_id, "Release called for unknown event");
                None
            }
        }
    }

    /// Change an event's capacity (administrative path).
    ///
    /// Rejected when the new capacity is below the current booked count,
    /// which would break the central invariant.
    pub fn set_capacity(&self, event_id: &str, capacity: u32) -> ReservationResult<Occupancy> {
        match self.records.get_mut(event_id) {
            Some(mut entry) => {
                let record = entry.value_mut();
                if capacity < record.booked_count {
                    return Err(ReservationError::invalid_capacity(
                        event_id,
                        capacity,
                        record.booked_count,
                    ));
                }
                record.capacity = capacity;
                Ok(record.occupancy())
            }
            None => Err(ReservationError::event_not_found(event_id)),
        }
    }

    /// Current counters for an event, read without the exclusive path
    pub fn occupancy(&self, event_id: &str) -> Option<Occupancy> {
        self.records.get(event_id).map(|entry| entry.occupancy())
    }

    /// Number of events the ledger is tracking
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
