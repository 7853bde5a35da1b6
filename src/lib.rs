#![allow(clippy::doc_markdown)] // Allow technical terms like camelCase, Node.js in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Booking Core Rust
//!
//! High-performance Rust implementation of the event booking platform's
//! reservation engine.
//!
//! ## Overview
//!
//! Booking Core Rust complements the platform's Node.js catalog API,
//! leveraging Rust's memory safety and fearless parallelism for the one
//! subsystem with genuine correctness hazards: turning a "book this event"
//! request into a durable, capacity-bounded, duplicate-free seat
//! allocation, and keeping every observer of an event's occupancy in sync
//! in real time.
//!
//! ## Architecture
//!
//! The engine serializes reservation attempts **per event**, never
//! globally, so unrelated events book fully in parallel while a single
//! event's check-and-mutate runs as one indivisible step. The previous
//! implementation's load-document, bump-counter, write-back pattern could
//! overbook under concurrent load; that pattern is structurally impossible
//! through this crate's API.
//!
//! ## Module Organization
//!
//! - [`models`] - reservations, capacity records, display types
//! - [`reservations`] - capacity ledger, uniqueness index, per-event
//!   sections, and the reserve/cancel coordinator
//! - [`realtime`] - subscription registry and occupancy fan-out
//! - [`catalog`] - collaborator seams (event catalog, user directory)
//! - [`config`] - configuration management
//! - [`error`] - structured error handling
//! - [`logging`] - structured tracing setup
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use booking_core::catalog::{InMemoryEventCatalog, InMemoryUserDirectory};
//! use booking_core::realtime::{OccupancyPublisher, SubscriptionRegistry};
//! use booking_core::reservations::{
//!     CapacityLedger, InMemoryReservationStore, ReservationCoordinator,
//! };
//!
//! # fn main() {
//! let catalog = Arc::new(InMemoryEventCatalog::new());
//! let users = Arc::new(InMemoryUserDirectory::new());
//! let registry = Arc::new(SubscriptionRegistry::new());
//! let publisher = Arc::new(OccupancyPublisher::new(Arc::clone(&registry)));
//!
//! let coordinator = ReservationCoordinator::new(
//!     catalog,
//!     users,
//!     Arc::new(InMemoryReservationStore::new()),
//!     Arc::new(CapacityLedger::new()),
//!     publisher,
//! );
//! coordinator.register_event("evt-1", 100);
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests, including concurrency suites
//! ```

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod realtime;
pub mod reservations;

pub use config::{BookingCoreConfig, EngineConfig, EventsConfig};
pub use error::{ReservationError, ReservationResult};
pub use models::{
    AuthenticatedUser, BookingStatus, CapacityRecord, EventDetail, EventSummary, Occupancy,
    Reservation, ReservationDetail, UserDetail, UserRole,
};
pub use realtime::{ClientMessage, OccupancyPublisher, ServerMessage, SubscriptionRegistry};
pub use reservations::{CapacityLedger, ReservationCoordinator};
