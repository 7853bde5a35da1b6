//! # Reservation Error Types
//!
//! Structured error handling for the reservation engine using thiserror
//! for typed failures instead of `Box<dyn Error>` patterns.
//!
//! Every failure a caller can observe is one of these variants; nothing is
//! swallowed and silently treated as success. Only `StorageConflict` is
//! eligible for bounded automatic retry, because nothing commits when the
//! atomic section fails.

use thiserror::Error;

/// Typed failures surfaced by the reservation engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: String },

    #[error("Event is fully booked: {event_id}")]
    AtCapacity { event_id: String },

    #[error("User {user_id} has already booked event {event_id}")]
    DuplicateBooking { user_id: String, event_id: String },

    #[error("Caller {caller_id} is not authorized to access {resource}")]
    Unauthorized { caller_id: String, resource: String },

    #[error("Reservation not found: {reservation_id}")]
    ReservationNotFound { reservation_id: String },

    #[error("Capacity {capacity} is below the booked count {booked_count} for event {event_id}")]
    InvalidCapacity {
        event_id: String,
        capacity: u32,
        booked_count: u32,
    },

    #[error("Storage conflict during {operation}: {reason}")]
    StorageConflict { operation: String, reason: String },

    #[error("Configuration error: {component}: {reason}")]
    Configuration { component: String, reason: String },
}

impl ReservationError {
    /// Create an event not found error
    pub fn event_not_found(event_id: impl Into<String>) -> Self {
        Self::EventNotFound {
            event_id: event_id.into(),
        }
    }

    /// Create an at-capacity error
    pub fn at_capacity(event_id: impl Into<String>) -> Self {
        Self::AtCapacity {
            event_id: event_id.into(),
        }
    }

    /// Create a duplicate booking error
    pub fn duplicate_booking(user_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self::DuplicateBooking {
            user_id: user_id.into(),
            event_id: event_id.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(caller_id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller_id: caller_id.into(),
            resource: resource.into(),
        }
    }

    /// Create a reservation not found error
    pub fn reservation_not_found(reservation_id: impl Into<String>) -> Self {
        Self::ReservationNotFound {
            reservation_id: reservation_id.into(),
        }
    }

    /// Create an invalid capacity error
    pub fn invalid_capacity(event_id: impl Into<String>, capacity: u32, booked_count: u32) -> Self {
        Self::InvalidCapacity {
            event_id: event_id.into(),
            capacity,
            booked_count,
        }
    }

    /// Create a storage conflict error
    pub fn storage_conflict(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StorageConflict {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failed operation is safe to retry locally.
    ///
    /// Only storage conflicts qualify: the atomic section commits nothing on
    /// failure, so replaying the attempt cannot double-apply. Every other
    /// variant is terminal and must be surfaced to the caller verbatim.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageConflict { .. })
    }

    /// Actionable message for the booking client, matching the phrasing the
    /// platform API has always returned.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EventNotFound { .. } => "Event not found",
            Self::AtCapacity { .. } => "Event is fully booked",
            Self::DuplicateBooking { .. } => "You have already booked this event",
            Self::Unauthorized { .. } => "Not authorized",
            Self::ReservationNotFound { .. } => "Booking not found",
            Self::InvalidCapacity { .. } => "Capacity cannot be lower than booked seats",
            Self::StorageConflict { .. } => "Booking could not be completed, please retry",
            Self::Configuration { .. } => "Service misconfigured",
        }
    }
}

impl From<config::ConfigError> for ReservationError {
    fn from(err: config::ConfigError) -> Self {
        ReservationError::configuration("loader", err.to_string())
    }
}

/// Result type alias for reservation operations
pub type ReservationResult<T> = Result<T, ReservationError>;
