//! Callback hooks for peer events.

use serde_json::Value;

use crate::error::ClientError;

/// Receives the events of a [`PresenceClient`](crate::PresenceClient).
///
/// Every method defaults to a no-op. Callbacks run on the client's read task,
/// so they should return quickly.
///
/// `on_peer_leave` may fire twice for the same id: once for the peer's own
/// `leave` and once when the relay notices the connection closed.
pub trait PeerEventHandler: Send + Sync + 'static {
    fn on_peer_join(&self, _id: &str, _username: &str, _state: &Value) {}
    fn on_peer_update(&self, _id: &str, _state: &Value) {}
    fn on_peer_leave(&self, _id: &str) {}
    fn on_connect(&self) {}
    fn on_disconnect(&self) {}
    fn on_error(&self, _error: &ClientError) {}
}
