//! Shared fixtures for the reservation engine test suites.
#![allow(dead_code)] // Each test binary uses a different slice of the fixtures

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use booking_core::catalog::{EventCatalog, InMemoryEventCatalog, InMemoryUserDirectory, UserDirectory};
use booking_core::error::{ReservationError, ReservationResult};
use booking_core::models::{EventCategory, EventSummary, Reservation, UserDetail, UserRole};
use booking_core::realtime::{
    ConnectionSink, OccupancyPublisher, ServerMessage, SubscriptionRegistry,
};
use booking_core::reservations::{
    CapacityLedger, InMemoryReservationStore, ReservationCoordinator, ReservationStore,
};

/// Fully wired engine with in-memory collaborators
pub struct TestEngine {
    pub coordinator: Arc<ReservationCoordinator>,
    pub catalog: Arc<InMemoryEventCatalog>,
    pub users: Arc<InMemoryUserDirectory>,
    pub registry: Arc<SubscriptionRegistry>,
    pub ledger: Arc<CapacityLedger>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryReservationStore::new()))
    }

    pub fn with_store(store: Arc<dyn ReservationStore>) -> Self {
        let catalog = Arc::new(InMemoryEventCatalog::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let registry = Arc::new(SubscriptionRegistry::new());
        let ledger = Arc::new(CapacityLedger::new());
        let publisher = Arc::new(OccupancyPublisher::new(Arc::clone(&registry)));

        let coordinator = Arc::new(ReservationCoordinator::new(
            Arc::clone(&catalog) as Arc<dyn EventCatalog>,
            Arc::clone(&users) as Arc<dyn UserDirectory>,
            store,
            Arc::clone(&ledger),
            publisher,
        ));

        Self {
            coordinator,
            catalog,
            users,
            registry,
            ledger,
        }
    }

    /// Put an event in the catalog and seed its capacity record
    pub fn seed_event(&self, event_id: &str, capacity: u32) {
        self.catalog.upsert_event(sample_event(event_id));
        self.coordinator.register_event(event_id, capacity);
    }

    /// Put a user in the directory
    pub fn seed_user(&self, user_id: &str, role: UserRole) {
        self.users.upsert_user(UserDetail {
            user_id: user_id.to_string(),
            name: format!("User {user_id}"),
            email: format!("{user_id}@example.com"),
            role,
        });
    }
}

pub fn sample_event(event_id: &str) -> EventSummary {
    EventSummary {
        event_id: event_id.to_string(),
        title: format!("Event {event_id}"),
        description: "Integration test event".to_string(),
        date: Utc::now(),
        venue: "Test Hall".to_string(),
        category: EventCategory::Conference,
        price: 20.0,
        image: String::new(),
    }
}

/// Store wrapper that fails a configured number of inserts before healing
pub struct FlakyReservationStore {
    inner: InMemoryReservationStore,
    failures_remaining: AtomicU32,
}

impl FlakyReservationStore {
    pub fn failing(times: u32) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryReservationStore::new(),
            failures_remaining: AtomicU32::new(times),
        })
    }

    fn maybe_fail(&self, operation: &str) -> ReservationResult<()> {
        let failed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ReservationError::storage_conflict(
                operation,
                "injected write failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for FlakyReservationStore {
    async fn insert(&self, reservation: Reservation) -> ReservationResult<()> {
        self.maybe_fail("insert")?;
        self.inner.insert(reservation).await
    }

    async fn remove(&self, reservation_id: Uuid) -> ReservationResult<Option<Reservation>> {
        self.maybe_fail("remove")?;
        self.inner.remove(reservation_id).await
    }

    async fn get(&self, reservation_id: Uuid) -> ReservationResult<Option<Reservation>> {
        self.inner.get(reservation_id).await
    }

    async fn find_by_user_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> ReservationResult<Option<Reservation>> {
        self.inner.find_by_user_event(user_id, event_id).await
    }

    async fn list_for_user(&self, user_id: &str) -> ReservationResult<Vec<Reservation>> {
        self.inner.list_for_user(user_id).await
    }

    async fn list_all(&self) -> ReservationResult<Vec<Reservation>> {
        self.inner.list_all().await
    }
}

/// Connection sink backed by an unbounded channel, for observing pushes
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ChannelSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

#[async_trait]
impl ConnectionSink for ChannelSink {
    async fn deliver(
        &self,
        message: &ServerMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sender.send(message.clone()).map_err(|_| {
            Box::<dyn std::error::Error + Send + Sync>::from("receiver dropped")
        })
    }
}
