//! Error types for the relay client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The connection is already closed
    #[error("Not connected")]
    NotConnected,

    /// State payloads must be JSON objects
    #[error("State must be a JSON object, got {0}")]
    InvalidState(String),

    /// An outbound event could not be serialized
    #[error("Encode error: {0}")]
    EncodeError(String),
}
