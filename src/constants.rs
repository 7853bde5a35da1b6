//! # System Constants
//!
//! Core constants that define the operational boundaries of the reservation
//! engine and the names shared with the booking platform's clients.
//!
//! Wire names stay compatible with the platform's existing socket protocol,
//! so clients built against the Node.js API keep working unchanged.

/// Real-time wire protocol names shared with booking clients
pub mod realtime {
    /// Client request to subscribe to an event's occupancy topic
    pub const JOIN_EVENT: &str = "joinEvent";
    /// Client request to unsubscribe from an event's occupancy topic
    pub const LEAVE_EVENT: &str = "leaveEvent";
    /// Server push carrying an event's new occupancy
    pub const BOOKING_UPDATE: &str = "bookingUpdate";

    /// Topic naming scheme for event-scoped subscriptions
    pub const EVENT_TOPIC_PREFIX: &str = "event:";

    /// Build the topic name for an event's occupancy channel
    pub fn event_topic(event_id: &str) -> String {
        format!("{EVENT_TOPIC_PREFIX}{event_id}")
    }
}

/// System-wide defaults
pub mod system {
    /// Capacity assigned to events created without an explicit value
    pub const DEFAULT_EVENT_CAPACITY: u32 = 100;

    /// Bounded retry budget for storage conflicts inside the atomic section
    pub const DEFAULT_RESERVE_RETRY_ATTEMPTS: u32 = 3;

    /// Delay between storage-conflict retries, in milliseconds
    pub const DEFAULT_RESERVE_RETRY_DELAY_MS: u64 = 25;

    /// Per-connection delivery timeout for occupancy pushes, in milliseconds
    pub const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 250;
}
