//! Client connection wrapper for the presence relay.
//!
//! [`PresenceClient`] joins a session, publishes local state, and reports peer
//! joins, updates and departures through a [`PeerEventHandler`].

pub mod domain;
pub mod error;
pub mod formatter;
pub mod handler;
pub mod session;

pub use error::ClientError;
pub use handler::PeerEventHandler;
pub use session::PresenceClient;
