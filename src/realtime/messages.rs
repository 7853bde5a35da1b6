//! Real-time wire protocol.
//!
//! Transport-agnostic message shapes for the persistent-connection channel.
//! Names and field casing match the socket protocol the platform's clients
//! already speak: `joinEvent` / `leaveEvent` requests and `bookingUpdate`
//! pushes carrying `{eventId, bookedCount, capacity}`.

use serde::{Deserialize, Serialize};

use crate::models::Occupancy;

/// Messages a connected client may send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Subscribe this connection to an event's occupancy topic
    JoinEvent { event_id: String },
    /// Unsubscribe this connection from an event's occupancy topic
    LeaveEvent { event_id: String },
}

/// Messages the server pushes to subscribed connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// New occupancy for an event, sent after every committed reserve/cancel
    BookingUpdate {
        event_id: String,
        booked_count: u32,
        capacity: u32,
    },
}

impl ServerMessage {
    /// Build the occupancy push for one event
    pub fn booking_update(event_id: impl Into<String>, occupancy: Occupancy) -> Self {
        Self::BookingUpdate {
            event_id: event_id.into(),
            booked_count: occupancy.booked_count,
            capacity: occupancy.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"joinEvent","eventId":"evt-1"}"#).unwrap();
        assert_eq!(
            parsed,
            ClientMessage::JoinEvent {
                event_id: "evt-1".to_string()
            }
        );

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"leaveEvent","eventId":"evt-1"}"#).unwrap();
        assert_eq!(
            parsed,
            ClientMessage::LeaveEvent {
                event_id: "evt-1".to_string()
            }
        );
    }

    #[test]
    fn test_booking_update_wire_format() {
        let message = ServerMessage::booking_update(
            "evt-1",
            Occupancy {
                booked_count: 3,
                capacity: 10,
            },
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "bookingUpdate",
                "eventId": "evt-1",
                "bookedCount": 3,
                "capacity": 10,
            })
        );
    }
}
