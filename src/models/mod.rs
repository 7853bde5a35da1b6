//! # Reservation Engine Data Layer
//!
//! Core data types shared across the engine: reservations, occupancy
//! records, and the catalog/identity display types resolved from the
//! platform's collaborator services.

pub mod capacity;
pub mod event;
pub mod reservation;
pub mod user;

pub use capacity::{CapacityRecord, Occupancy};
pub use event::{EventCategory, EventDetail, EventSummary};
pub use reservation::{BookingStatus, NewReservation, Reservation, ReservationDetail};
pub use user::{AuthenticatedUser, UserDetail, UserRole};
