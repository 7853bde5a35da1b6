//! # Reservation Store
//!
//! Persistence seam for reservation records. The trait is async so a
//! database-backed store can satisfy the same contract as the in-memory
//! default; either way, all writes happen inside the coordinator's
//! per-event exclusive section, which is what makes the in-process
//! single-writer deployment model sound.
//!
//! Store failures surface as `StorageConflict` and commit nothing, so the
//! coordinator may retry them within its bounded budget.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::ReservationResult;
use crate::models::Reservation;

/// Storage contract for reservation records
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persist a new reservation record
    async fn insert(&self, reservation: Reservation) -> ReservationResult<()>;

    /// Delete a record, returning it if it existed
    async fn remove(&self, reservation_id: Uuid) -> ReservationResult<Option<Reservation>>;

    /// Fetch a record by id
    async fn get(&self, reservation_id: Uuid) -> ReservationResult<Option<Reservation>>;

    /// Fetch the live record for a `(user, event)` pair, if any
    async fn find_by_user_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> ReservationResult<Option<Reservation>>;

    /// All records for one user, newest first
    async fn list_for_user(&self, user_id: &str) -> ReservationResult<Vec<Reservation>>;

    /// Every record in the store, newest first
    async fn list_all(&self) -> ReservationResult<Vec<Reservation>>;
}

/// Default in-memory store backed by a sharded concurrent map
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    records: DashMap<Uuid, Reservation>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    fn sorted_newest_first(mut records: Vec<Reservation>) -> Vec<Reservation> {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn insert(&self, reservation: Reservation) -> ReservationResult<()> {
        self.records
            .insert(reservation.reservation_id, reservation);
        Ok(())
    }

    async fn remove(&self, reservation_id: Uuid) -> ReservationResult<Option<Reservation>> {
        Ok(self
            .records
            .remove(&reservation_id)
            .map(|(_, reservation)| reservation))
    }

    async fn get(&self, reservation_id: Uuid) -> ReservationResult<Option<Reservation>> {
        Ok(self
            .records
            .get(&reservation_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_user_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> ReservationResult<Option<Reservation>> {
        Ok(self.records.iter().find_map(|entry| {
            let record = entry.value();
            (record.user_id == user_id && record.event_id == event_id).then(|| record.clone())
        }))
    }

    async fn list_for_user(&self, user_id: &str) -> ReservationResult<Vec<Reservation>> {
        let records = self
            .records
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        Ok(Self::sorted_newest_first(records))
    }

    async fn list_all(&self) -> ReservationResult<Vec<Reservation>> {
        let records = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Ok(Self::sorted_newest_first(records))
    }
}
