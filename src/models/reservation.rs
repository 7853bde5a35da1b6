//! Reservation records owned by the Reservation Coordinator.
//!
//! A reservation's existence and a ledger increment are paired: one must
//! never exist without the other for the same logical booking. The
//! coordinator enforces that pairing inside the per-event exclusive section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::EventDetail;
use super::user::UserDetail;

/// A committed record binding one user to one event's occupied seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: Uuid,
    pub user_id: String,
    pub event_id: String,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Mint a new reservation with a generated id and current timestamp
    pub fn create(new: NewReservation) -> Self {
        Self {
            reservation_id: Uuid::new_v4(),
            user_id: new.user_id,
            event_id: new.event_id,
            created_at: Utc::now(),
        }
    }
}

/// Reservation input (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub user_id: String,
    pub event_id: String,
}

/// Reservation populated with event and user detail for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub event: EventDetail,
    pub user: UserDetail,
}

/// Answer to "has this user booked this event?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatus {
    pub is_booked: bool,
}
