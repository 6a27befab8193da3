//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One registered participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub id: String,
    pub username: String,
    pub state: serde_json::Value,
    /// RFC 3339 (UTC)
    pub joined_at: String,
}

/// Debug view of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStateDto {
    pub participants: Vec<ParticipantDto>,
    pub open_connections: usize,
}
