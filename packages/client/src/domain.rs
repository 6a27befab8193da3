//! Domain logic for client-side operations.
//!
//! Pure functions without side effects, so they are easy to test.

use relay_server::infrastructure::dto::websocket::EventMessage;
use serde_json::Value;

/// An inbound event the handler should see.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Join {
        id: String,
        username: String,
        state: Value,
    },
    Update {
        id: String,
        state: Value,
    },
    Leave {
        id: String,
    },
}

/// Apply self-echo suppression to an inbound event.
///
/// `update` and `leave` carrying our own id are dropped. Our own `join` is
/// accepted, since a catch-up snapshot may legitimately contain it.
///
/// # Returns
///
/// `Some(PeerEvent)` if the event should be dispatched, `None` otherwise
pub fn classify_incoming(own_id: &str, message: EventMessage) -> Option<PeerEvent> {
    match message {
        EventMessage::Join {
            id,
            username,
            state,
        } => Some(PeerEvent::Join {
            id,
            username,
            state,
        }),
        EventMessage::Update { id, .. } | EventMessage::Leave { id } if id == own_id => None,
        EventMessage::Update { id, state } => Some(PeerEvent::Update { id, state }),
        EventMessage::Leave { id } => Some(PeerEvent::Leave { id }),
    }
}
