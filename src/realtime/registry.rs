//! # Subscription Registry
//!
//! Registry tracking which live connections are interested in which event's
//! occupancy, with thread-safe operations.
//!
//! ## Overview
//!
//! The registry is a multimap keyed by event id: many connections may watch
//! one event and one connection may watch many events. It is deliberately
//! decoupled from the reservation critical path: the Occupancy Publisher
//! reads a snapshot of subscribers at publish time, and nothing here ever
//! gates a reserve or cancel.
//!
//! ## Key Features
//!
//! - **Thread-safe subscription management** using RwLock for concurrent access
//! - **Idempotent join/leave** with no capacity limit per topic
//! - **Connection lifecycle management**: `disconnect` drops every
//!   subscription a connection holds, covering connection loss
//! - **Subscription statistics** for monitoring
//!
//! The same contract can be satisfied by this single-instance in-memory map
//! or by a distributed broker; the coordinator never knows the difference.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ReservationError, ReservationResult};
use crate::realtime::messages::ServerMessage;

/// Delivery seam for one live connection.
///
/// An in-memory channel (tests), a websocket writer, or a broker producer
/// can all satisfy this. Delivery failures are reported to the publisher,
/// which logs them and moves on; they never propagate further.
#[async_trait]
pub trait ConnectionSink: Send + Sync {
    /// Push one message to the connected client
    async fn deliver(
        &self,
        message: &ServerMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Registry for event-scoped occupancy subscriptions
pub struct SubscriptionRegistry {
    /// Map of connection id to its delivery sink
    connections: RwLock<HashMap<String, Arc<dyn ConnectionSink>>>,
    /// Map of event id to the connection ids subscribed to it
    topic_subscribers: RwLock<HashMap<String, HashSet<String>>>,
    /// Reverse index: connection id to the event ids it watches
    connection_topics: RwLock<HashMap<String, HashSet<String>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            topic_subscribers: RwLock::new(HashMap::new()),
            connection_topics: RwLock::new(HashMap::new()),
        }
    }

    /// Register a live connection and its delivery sink
    pub async fn register_connection(
        &self,
        connection_id: &str,
        sink: Arc<dyn ConnectionSink>,
    ) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id.to_string(), sink);
        debug!(connection_id = connection_id, "Connection registered");
    }

    /// Subscribe a connection to an event's occupancy topic.
    ///
    /// Idempotent; joining a topic twice is a no-op. Unknown connections are
    /// rejected, since a sink must be registered before it can subscribe.
    pub async fn join(&self, connection_id: &str, event_id: &str) -> ReservationResult<()> {
        {
            let connections = self.connections.read().await;
            if !connections.contains_key(connection_id) {
                return Err(ReservationError::configuration(
                    "subscription_registry",
                    format!("Connection '{connection_id}' is not registered"),
                ));
            }
        }

        {
            let mut topic_subscribers = self.topic_subscribers.write().await;
            topic_subscribers
                .entry(event_id.to_string())
                .or_default()
                .insert(connection_id.to_string());
        }
        {
            let mut connection_topics = self.connection_topics.write().await;
            connection_topics
                .entry(connection_id.to_string())
                .or_default()
                .insert(event_id.to_string());
        }

        debug!(
            connection_id = connection_id,
            event_id = event_id,
            "Connection joined event topic"
        );
        Ok(())
    }

    /// Unsubscribe a connection from an event's occupancy topic (idempotent)
    pub async fn leave(&self, connection_id: &str, event_id: &str) {
        {
            let mut topic_subscribers = self.topic_subscribers.write().await;
            if let Some(subscribers) = topic_subscribers.get_mut(event_id) {
                subscribers.remove(connection_id);
                if subscribers.is_empty() {
                    topic_subscribers.remove(event_id);
                }
            }
        }
        {
            let mut connection_topics = self.connection_topics.write().await;
            if let Some(topics) = connection_topics.get_mut(connection_id) {
                topics.remove(event_id);
                if topics.is_empty() {
                    connection_topics.remove(connection_id);
                }
            }
        }

        debug!(
            connection_id = connection_id,
            event_id = event_id,
            "Connection left event topic"
        );
    }

    /// Drop a connection and every subscription it holds (connection loss)
    pub async fn disconnect(&self, connection_id: &str) {
        let topics = {
            let mut connection_topics = self.connection_topics.write().await;
            connection_topics.remove(connection_id).unwrap_or_default()
        };

        {
            let mut topic_subscribers = self.topic_subscribers.write().await;
            for event_id in &topics {
                if let Some(subscribers) = topic_subscribers.get_mut(event_id) {
                    subscribers.remove(connection_id);
                    if subscribers.is_empty() {
                        topic_subscribers.remove(event_id);
                    }
                }
            }
        }
        {
            let mut connections = self.connections.write().await;
            connections.remove(connection_id);
        }

        info!(
            connection_id = connection_id,
            dropped_subscriptions = topics.len(),
            "Connection disconnected"
        );
    }

    /// Snapshot of the sinks subscribed to an event at this moment.
    ///
    /// Connections that join after the snapshot do not receive the message
    /// being published; there is no replay buffer.
    pub async fn subscribers_of(
        &self,
        event_id: &str,
    ) -> Vec<(String, Arc<dyn ConnectionSink>)> {
        let topic_subscribers = self.topic_subscribers.read().await;
        let connections = self.connections.read().await;

        let Some(subscriber_ids) = topic_subscribers.get(event_id) else {
            return Vec::new();
        };

        subscriber_ids
            .iter()
            .filter_map(|connection_id| {
                connections
                    .get(connection_id)
                    .map(|sink| (connection_id.clone(), Arc::clone(sink)))
            })
            .collect()
    }

    /// Subscription statistics for monitoring
    pub async fn stats(&self) -> SubscriptionStats {
        let connections = self.connections.read().await;
        let topic_subscribers = self.topic_subscribers.read().await;

        SubscriptionStats {
            total_connections: connections.len(),
            total_topics: topic_subscribers.len(),
            total_subscriptions: topic_subscribers.values().map(HashSet::len).sum(),
        }
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about live subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionStats {
    pub total_connections: usize,
    pub total_topics: usize,
    pub total_subscriptions: usize,
}
