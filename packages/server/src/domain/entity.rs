//! エンティティ

use super::value_object::{ParticipantId, ParticipantState, Timestamp, Username};

/// A registered participant and its last-known state.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub username: Username,
    pub state: ParticipantState,
    /// When the latest `join` for this id was applied
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        username: Username,
        state: ParticipantState,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            state,
            joined_at,
        }
    }
}
