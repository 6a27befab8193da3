//! Presence relay server library.
//!
//! Tracks the participants of a single multiplayer session, keeps their
//! last-known state, and relays join/update/leave events to every other
//! connected client over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
