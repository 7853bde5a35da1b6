//! Reservation Engine Demo Binary
//!
//! Standalone smoke run for the reservation engine: wires the in-memory
//! collaborators, floods one event with concurrent booking attempts, and
//! shows the occupancy broadcast reaching a subscribed connection.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use booking_core::catalog::{
    EventCatalog, InMemoryEventCatalog, InMemoryUserDirectory, UserDirectory,
};
use booking_core::config::BookingCoreConfig;
use booking_core::error::ReservationError;
use booking_core::logging::init_structured_logging;
use booking_core::models::{AuthenticatedUser, EventCategory, EventSummary, UserRole};
use booking_core::realtime::{
    ConnectionSink, OccupancyPublisher, ServerMessage, SubscriptionRegistry,
};
use booking_core::reservations::{
    CapacityLedger, InMemoryReservationStore, ReservationCoordinator,
};

/// Sink that logs every push it receives
struct LogSink {
    connection_id: String,
}

#[async_trait]
impl ConnectionSink for LogSink {
    async fn deliver(
        &self,
        message: &ServerMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            connection_id = %self.connection_id,
            message = %serde_json::to_string(message)?,
            "Occupancy push delivered"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_structured_logging();
    let config = BookingCoreConfig::load()?;

    let catalog = Arc::new(InMemoryEventCatalog::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let registry = Arc::new(SubscriptionRegistry::new());
    let ledger = Arc::new(CapacityLedger::new());
    let publisher = Arc::new(OccupancyPublisher::with_config(
        Arc::clone(&registry),
        config.events.publisher_config(),
    ));

    let coordinator = Arc::new(ReservationCoordinator::with_config(
        Arc::clone(&catalog) as Arc<dyn EventCatalog>,
        Arc::clone(&users) as Arc<dyn UserDirectory>,
        Arc::new(InMemoryReservationStore::new()),
        Arc::clone(&ledger),
        publisher,
        config.engine.coordinator_config(),
    ));

    catalog.upsert_event(EventSummary {
        event_id: "demo-concert".to_string(),
        title: "Demo Concert".to_string(),
        description: "Smoke-run event".to_string(),
        date: chrono::Utc::now(),
        venue: "Demo Hall".to_string(),
        category: EventCategory::Concert,
        price: 25.0,
        image: String::new(),
    });
    coordinator.register_event("demo-concert", 10);

    registry
        .register_connection(
            "demo-conn",
            Arc::new(LogSink {
                connection_id: "demo-conn".to_string(),
            }),
        )
        .await;
    registry.join("demo-conn", "demo-concert").await?;

    // 25 users race for 10 seats
    let mut handles = Vec::new();
    for i in 0..25 {
        let coordinator = Arc::clone(&coordinator);
        handles.push(tokio::spawn(async move {
            coordinator.reserve(&format!("user-{i}"), "demo-concert").await
        }));
    }

    let mut booked = Vec::new();
    let mut sold_out = 0u32;
    for handle in handles {
        match handle.await? {
            Ok(detail) => booked.push(detail),
            Err(ReservationError::AtCapacity { .. }) => sold_out += 1,
            Err(other) => return Err(other.into()),
        }
    }

    info!(
        successes = booked.len(),
        rejected = sold_out,
        occupancy = ?coordinator.event_occupancy("demo-concert"),
        "Booking burst complete"
    );

    // Free one seat back up
    let cancelled = &booked[0];
    coordinator
        .cancel(
            cancelled.reservation.reservation_id,
            &AuthenticatedUser::new(cancelled.reservation.user_id.clone(), UserRole::User),
        )
        .await?;

    // Give the detached broadcasts a moment to drain before exit
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    info!(
        occupancy = ?coordinator.event_occupancy("demo-concert"),
        "Demo finished"
    );
    Ok(())
}
