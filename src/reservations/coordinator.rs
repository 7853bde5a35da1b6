//! # Reservation Coordinator
//!
//! Composes the Capacity Ledger, Uniqueness Index, and reservation store
//! into an atomic reserve/cancel protocol, and hands committed outcomes to
//! the Occupancy Publisher.
//!
//! ## Architecture
//!
//! Every reserve or cancel for one event runs under that event's exclusive
//! section; attempts for different events proceed fully in parallel. The
//! section spans only the check-and-mutate steps. Catalog lookups happen
//! before it, response population and occupancy publishing after it, so
//! its hold time stays minimal.
//!
//! ## Failure semantics
//!
//! Inside the section the three mutations (ledger increment, index entry,
//! reservation record) commit together or not at all: a storage failure
//! rolls back the in-memory mutations before the section is released.
//! Storage conflicts are retried within a bounded budget because nothing
//! commits on failure; all other errors surface to the caller verbatim.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::catalog::{EventCatalog, UserDirectory};
use crate::constants::system;
use crate::error::{ReservationError, ReservationResult};
use crate::logging::log_reservation_operation;
use crate::models::{
    AuthenticatedUser, BookingStatus, EventDetail, NewReservation, Occupancy, Reservation,
    ReservationDetail, UserDetail, UserRole,
};
use crate::realtime::OccupancyPublisher;
use crate::reservations::ledger::{CapacityLedger, TryReserve};
use crate::reservations::locks::EventLockMap;
use crate::reservations::store::ReservationStore;
use crate::reservations::uniqueness::{InsertOutcome, UniquenessIndex};

/// Retry policy for the atomic section
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Bounded retry budget for storage conflicts
    pub reserve_retry_attempts: u32,
    /// Delay between storage-conflict retries
    pub reserve_retry_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            reserve_retry_attempts: system::DEFAULT_RESERVE_RETRY_ATTEMPTS,
            reserve_retry_delay: Duration::from_millis(system::DEFAULT_RESERVE_RETRY_DELAY_MS),
        }
    }
}

/// Owns reservation records and the reserve/cancel protocol
pub struct ReservationCoordinator {
    catalog: Arc<dyn EventCatalog>,
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn ReservationStore>,
    ledger: Arc<CapacityLedger>,
    uniqueness: Arc<UniquenessIndex>,
    locks: EventLockMap,
    publisher: Arc<OccupancyPublisher>,
    config: CoordinatorConfig,
}

impl ReservationCoordinator {
    pub fn new(
        catalog: Arc<dyn EventCatalog>,
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn ReservationStore>,
        ledger: Arc<CapacityLedger>,
        publisher: Arc<OccupancyPublisher>,
    ) -> Self {
        Self::with_config(
            catalog,
            users,
            store,
            ledger,
            publisher,
            CoordinatorConfig::default(),
        )
    }

    pub fn with_config(
        catalog: Arc<dyn EventCatalog>,
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn ReservationStore>,
        ledger: Arc<CapacityLedger>,
        publisher: Arc<OccupancyPublisher>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            catalog,
            users,
            store,
            ledger,
            uniqueness: Arc::new(UniquenessIndex::new()),
            locks: EventLockMap::new(),
            publisher,
            config,
        }
    }

    /// Seed the ledger when the catalog introduces an event to the engine.
    ///
    /// Idempotent; an existing record keeps its booked count.
    pub fn register_event(&self, event_id: &str, capacity: u32) -> bool {
        self.ledger.register(event_id, capacity)
    }

    /// Administrative capacity edit.
    ///
    /// Rejected below the current booked count. Deliberately does not emit
    /// an occupancy push: only seat reservation and release broadcast.
    pub fn set_event_capacity(
        &self,
        event_id: &str,
        capacity: u32,
        caller: &AuthenticatedUser,
    ) -> ReservationResult<Occupancy> {
        if !caller.role.is_admin() {
            return Err(ReservationError::unauthorized(
                &caller.user_id,
                format!("capacity of event {event_id}"),
            ));
        }
        self.ledger.set_capacity(event_id, capacity)
    }

    /// Book one seat on an event for a user.
    ///
    /// Returns the created reservation populated with event and user detail,
    /// or a typed failure; a failed attempt leaves the ledger, the index,
    /// and the reservation set exactly as they were.
    #[instrument(skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn reserve(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> ReservationResult<ReservationDetail> {
        // Catalog lookup stays outside the exclusive section
        let summary = self
            .catalog
            .find_event(event_id)
            .await?
            .ok_or_else(|| ReservationError::event_not_found(event_id))?;

        let mut attempt = 0;
        let (reservation, occupancy) = loop {
            attempt += 1;
            match self.commit_reserve(user_id, event_id).await {
                Ok(committed) => break committed,
                Err(error) if error.is_retryable() && attempt < self.config.reserve_retry_attempts => {
                    warn!(
                        user_id = user_id,
                        event_id = event_id,
                        attempt = attempt,
                        error = %error,
                        "Storage conflict during reserve, retrying"
                    );
                    tokio::time::sleep(self.config.reserve_retry_delay).await;
                }
                Err(error) => {
                    log_reservation_operation(
                        "reserve",
                        None,
                        user_id,
                        event_id,
                        "rejected",
                        Some(error.user_message()),
                    );
                    return Err(error);
                }
            }
        };

        log_reservation_operation(
            "reserve",
            Some(reservation.reservation_id),
            user_id,
            event_id,
            "committed",
            None,
        );

        // Best-effort broadcast; the committed outcome can no longer change
        Arc::clone(&self.publisher).publish_detached(event_id.to_string(), occupancy);

        let user = self.user_detail(user_id).await?;
        Ok(ReservationDetail {
            reservation,
            event: EventDetail::from_parts(summary, occupancy),
            user,
        })
    }

    /// The exclusive section of a reserve attempt: uniqueness and capacity
    /// evaluated as one unit, committed together or not at all.
    async fn commit_reserve(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> ReservationResult<(Reservation, Occupancy)> {
        let _section = self.locks.acquire(event_id).await;

        if self.uniqueness.contains(user_id, event_id) {
            return Err(ReservationError::duplicate_booking(user_id, event_id));
        }

        let occupancy = match self.ledger.try_reserve(event_id) {
            TryReserve::Reserved(occupancy) => occupancy,
            TryReserve::AtCapacity(_) => {
                return Err(ReservationError::at_capacity(event_id));
            }
            TryReserve::EventNotFound => {
                return Err(ReservationError::event_not_found(event_id));
            }
        };

        // Holding the section after the contains() check above, this can
        // only be Inserted; treat anything else as index corruption.
        if self.uniqueness.insert_if_absent(user_id, event_id) == InsertOutcome::AlreadyExists {
            self.ledger.release(event_id);
            return Err(ReservationError::storage_conflict(
                "uniqueness_insert",
                "pair appeared while the event section was held",
            ));
        }

        let reservation = Reservation::create(NewReservation {
            user_id: user_id.to_string(),
            event_id: event_id.to_string(),
        });

        if let Err(error) = self.store.insert(reservation.clone()).await {
            // Roll back before the section releases: no partial effects
            self.uniqueness.remove(user_id, event_id);
            self.ledger.release(event_id);
            return Err(error);
        }

        debug!(
            reservation_id = %reservation.reservation_id,
            booked_count = occupancy.booked_count,
            capacity = occupancy.capacity,
            "Reservation committed"
        );
        Ok((reservation, occupancy))
    }

    /// Cancel a reservation on behalf of its owner or an admin.
    #[instrument(skip(self, caller), fields(reservation_id = %reservation_id, caller_id = %caller.user_id))]
    pub async fn cancel(
        &self,
        reservation_id: uuid::Uuid,
        caller: &AuthenticatedUser,
    ) -> ReservationResult<()> {
        let reservation = self
            .store
            .get(reservation_id)
            .await?
            .ok_or_else(|| ReservationError::reservation_not_found(reservation_id.to_string()))?;

        if !caller.can_access_reservation_of(&reservation.user_id) {
            log_reservation_operation(
                "cancel",
                Some(reservation_id),
                &caller.user_id,
                &reservation.event_id,
                "rejected",
                Some("Not authorized"),
            );
            return Err(ReservationError::unauthorized(
                &caller.user_id,
                format!("reservation {reservation_id}"),
            ));
        }

        let mut attempt = 0;
        let occupancy = loop {
            attempt += 1;
            match self.commit_cancel(&reservation).await {
                Ok(occupancy) => break occupancy,
                Err(error) if error.is_retryable() && attempt < self.config.reserve_retry_attempts => {
                    warn!(
                        reservation_id = %reservation_id,
                        attempt = attempt,
                        error = %error,
                        "Storage conflict during cancel, retrying"
                    );
                    tokio::time::sleep(self.config.reserve_retry_delay).await;
                }
                Err(error) => return Err(error),
            }
        };

        log_reservation_operation(
            "cancel",
            Some(reservation_id),
            &caller.user_id,
            &reservation.event_id,
            "committed",
            None,
        );

        if let Some(occupancy) = occupancy {
            Arc::clone(&self.publisher).publish_detached(reservation.event_id.clone(), occupancy);
        }
        Ok(())
    }

    /// The exclusive section of a cancel: the record removal is the commit
    /// point, so a storage failure leaves the ledger and index untouched.
    async fn commit_cancel(
        &self,
        reservation: &Reservation,
    ) -> ReservationResult<Option<Occupancy>> {
        let _section = self.locks.acquire(&reservation.event_id).await;

        let removed = self.store.remove(reservation.reservation_id).await?;
        if removed.is_none() {
            // A concurrent cancel won the section first
            return Err(ReservationError::reservation_not_found(
                reservation.reservation_id.to_string(),
            ));
        }

        self.uniqueness
            .remove(&reservation.user_id, &reservation.event_id);
        Ok(self.ledger.release(&reservation.event_id))
    }

    /// Whether a user currently holds a reservation for an event.
    ///
    /// Reads the index without the section; display-grade consistency.
    pub fn booking_status(&self, user_id: &str, event_id: &str) -> BookingStatus {
        BookingStatus {
            is_booked: self.uniqueness.contains(user_id, event_id),
        }
    }

    /// Current counters for an event, read without the section
    pub fn event_occupancy(&self, event_id: &str) -> Option<Occupancy> {
        self.ledger.occupancy(event_id)
    }

    /// Fetch one reservation, restricted to its owner or an admin
    pub async fn get_reservation(
        &self,
        reservation_id: uuid::Uuid,
        caller: &AuthenticatedUser,
    ) -> ReservationResult<ReservationDetail> {
        let reservation = self
            .store
            .get(reservation_id)
            .await?
            .ok_or_else(|| ReservationError::reservation_not_found(reservation_id.to_string()))?;

        if !caller.can_access_reservation_of(&reservation.user_id) {
            return Err(ReservationError::unauthorized(
                &caller.user_id,
                format!("reservation {reservation_id}"),
            ));
        }

        self.populate(reservation.clone()).await?.ok_or_else(|| {
            ReservationError::event_not_found(reservation.event_id.clone())
        })
    }

    /// All reservations held by one user, newest first
    pub async fn list_user_reservations(
        &self,
        user_id: &str,
    ) -> ReservationResult<Vec<ReservationDetail>> {
        let records = self.store.list_for_user(user_id).await?;
        self.populate_all(records).await
    }

    /// Every reservation in the system, newest first (admin only)
    pub async fn list_all_reservations(
        &self,
        caller: &AuthenticatedUser,
    ) -> ReservationResult<Vec<ReservationDetail>> {
        if !caller.role.is_admin() {
            return Err(ReservationError::unauthorized(
                &caller.user_id,
                "all reservations",
            ));
        }
        let records = self.store.list_all().await?;
        self.populate_all(records).await
    }

    async fn populate_all(
        &self,
        records: Vec<Reservation>,
    ) -> ReservationResult<Vec<ReservationDetail>> {
        let mut details = Vec::with_capacity(records.len());
        for record in records {
            if let Some(detail) = self.populate(record).await? {
                details.push(detail);
            }
        }
        Ok(details)
    }

    /// Join a record with event and user detail; `None` when the event has
    /// since left the catalog.
    async fn populate(
        &self,
        reservation: Reservation,
    ) -> ReservationResult<Option<ReservationDetail>> {
        let Some(summary) = self.catalog.find_event(&reservation.event_id).await? else {
            debug!(
                reservation_id = %reservation.reservation_id,
                event_id = %reservation.event_id,
                "Skipping reservation whose event left the catalog"
            );
            return Ok(None);
        };

        let occupancy = self
            .ledger
            .occupancy(&reservation.event_id)
            .unwrap_or(Occupancy {
                booked_count: 0,
                capacity: 0,
            });
        let user = self.user_detail(&reservation.user_id).await?;

        Ok(Some(ReservationDetail {
            reservation,
            event: EventDetail::from_parts(summary, occupancy),
            user,
        }))
    }

    async fn user_detail(&self, user_id: &str) -> ReservationResult<UserDetail> {
        match self.users.find_user(user_id).await? {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = user_id, "User missing from directory, using bare profile");
                Ok(UserDetail {
                    user_id: user_id.to_string(),
                    name: String::new(),
                    email: String::new(),
                    role: UserRole::User,
                })
            }
        }
    }
}
