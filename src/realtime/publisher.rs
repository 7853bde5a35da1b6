//! # Occupancy Publisher
//!
//! Pushes an event's new occupancy to every connection subscribed at the
//! moment of the call. Delivery is at-most-once and best-effort: a failed
//! or slow connection never blocks delivery to the others, and never blocks
//! or fails the reserve/cancel that triggered the push.
//!
//! The publisher observes outcomes, it does not gate them. The coordinator
//! dispatches publishes on a detached task so the per-event critical
//! section's hold time is unaffected.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::constants::system;
use crate::logging::log_broadcast_operation;
use crate::models::Occupancy;
use crate::realtime::messages::ServerMessage;
use crate::realtime::registry::SubscriptionRegistry;

/// Publisher tuning
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Per-connection delivery timeout
    pub delivery_timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_millis(system::DEFAULT_PUBLISH_TIMEOUT_MS),
        }
    }
}

/// Fan-out of occupancy changes to subscribed connections
pub struct OccupancyPublisher {
    registry: Arc<SubscriptionRegistry>,
    config: PublisherConfig,
}

impl OccupancyPublisher {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self::with_config(registry, PublisherConfig::default())
    }

    pub fn with_config(registry: Arc<SubscriptionRegistry>, config: PublisherConfig) -> Self {
        Self { registry, config }
    }

    /// Deliver the occupancy push to the current subscriber snapshot.
    ///
    /// Deliveries run concurrently, each bounded by the configured timeout.
    /// Returns the number of successful deliveries; failures are logged and
    /// never propagated.
    pub async fn publish(&self, event_id: &str, occupancy: Occupancy) -> usize {
        let subscribers = self.registry.subscribers_of(event_id).await;
        if subscribers.is_empty() {
            debug!(event_id = event_id, "No subscribers for occupancy push");
            return 0;
        }

        let message = ServerMessage::booking_update(event_id, occupancy);
        let deliveries = subscribers.iter().map(|(connection_id, sink)| {
            let message = &message;
            let delivery_timeout = self.config.delivery_timeout;
            async move {
                match timeout(delivery_timeout, sink.deliver(message)).await {
                    Ok(Ok(())) => true,
                    Ok(Err(error)) => {
                        warn!(
                            connection_id = %connection_id,
                            event_id = event_id,
                            error = %error,
                            "Occupancy push delivery failed"
                        );
                        false
                    }
                    Err(_) => {
                        warn!(
                            connection_id = %connection_id,
                            event_id = event_id,
                            timeout_ms = delivery_timeout.as_millis() as u64,
                            "Occupancy push delivery timed out"
                        );
                        false
                    }
                }
            }
        });

        let delivered = join_all(deliveries)
            .await
            .into_iter()
            .filter(|&ok| ok)
            .count();

        log_broadcast_operation(
            "booking_update",
            event_id,
            subscribers.len(),
            delivered,
            "published",
        );

        delivered
    }

    /// Fire-and-forget publish used on the reserve/cancel path.
    ///
    /// Spawns the fan-out on its own task so the caller returns immediately;
    /// the committed outcome can no longer be undone by anything that
    /// happens here.
    pub fn publish_detached(self: Arc<Self>, event_id: String, occupancy: Occupancy) {
        tokio::spawn(async move {
            self.publish(&event_id, occupancy).await;
        });
    }
}
