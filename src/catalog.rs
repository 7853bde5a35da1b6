//! # Collaborator Boundaries
//!
//! Traits for the two external collaborators the engine reads from: the
//! Event Catalog (event metadata and existence) and the Identity Provider's
//! user directory (profile fields for display).
//!
//! The engine never mutates catalog metadata; capacity counters live in the
//! Capacity Ledger. Lookups may suspend (a real deployment backs these with
//! a database or a service call), which is why both seams are async and why
//! the coordinator performs them outside the per-event exclusive section.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::ReservationResult;
use crate::models::{EventSummary, UserDetail};

/// Read access to the platform's event catalog
#[async_trait]
pub trait EventCatalog: Send + Sync {
    /// Whether the event exists in the catalog
    async fn exists(&self, event_id: &str) -> ReservationResult<bool>;

    /// Fetch event metadata for display (no occupancy counters)
    async fn find_event(&self, event_id: &str) -> ReservationResult<Option<EventSummary>>;
}

/// Read access to user profiles for populating booking responses
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user's display fields
    async fn find_user(&self, user_id: &str) -> ReservationResult<Option<UserDetail>>;
}

/// In-memory event catalog for tests and single-process deployments
#[derive(Debug, Default)]
pub struct InMemoryEventCatalog {
    events: DashMap<String, EventSummary>,
}

impl InMemoryEventCatalog {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
        }
    }

    /// Add or replace an event's metadata
    pub fn upsert_event(&self, event: EventSummary) {
        self.events.insert(event.event_id.clone(), event);
    }

    /// Remove an event from the catalog
    pub fn remove_event(&self, event_id: &str) {
        self.events.remove(event_id);
    }
}

#[async_trait]
impl EventCatalog for InMemoryEventCatalog {
    async fn exists(&self, event_id: &str) -> ReservationResult<bool> {
        Ok(self.events.contains_key(event_id))
    }

    async fn find_event(&self, event_id: &str) -> ReservationResult<Option<EventSummary>> {
        Ok(self.events.get(event_id).map(|entry| entry.value().clone()))
    }
}

/// In-memory user directory for tests and single-process deployments
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<String, UserDetail>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Add or replace a user profile
    pub fn upsert_user(&self, user: UserDetail) {
        self.users.insert(user.user_id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, user_id: &str) -> ReservationResult<Option<UserDetail>> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }
}
