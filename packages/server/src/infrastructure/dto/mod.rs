//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: wire events exchanged over the relay connection
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
