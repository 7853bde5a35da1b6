//! # Real-Time Occupancy Broadcast
//!
//! Subscription tracking and occupancy fan-out for persistent client
//! connections. Components here observe reservation outcomes; they never
//! gate them.
//!
//! - [`registry`] - which connections watch which event topics
//! - [`publisher`] - best-effort fan-out of occupancy changes
//! - [`messages`] - the wire protocol shared with booking clients

pub mod messages;
pub mod publisher;
pub mod registry;

pub use messages::{ClientMessage, ServerMessage};
pub use publisher::{OccupancyPublisher, PublisherConfig};
pub use registry::{ConnectionSink, SubscriptionRegistry, SubscriptionStats};
