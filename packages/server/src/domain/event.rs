//! Presence events relayed between participants.

use super::{
    entity::Participant,
    value_object::{ParticipantId, ParticipantState, Username},
};

#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    Join {
        id: ParticipantId,
        username: Username,
        state: ParticipantState,
    },
    Update {
        id: ParticipantId,
        state: ParticipantState,
    },
    Leave {
        id: ParticipantId,
    },
}

impl PresenceEvent {
    /// The participant id the event is about.
    pub fn participant_id(&self) -> &ParticipantId {
        match self {
            PresenceEvent::Join { id, .. }
            | PresenceEvent::Update { id, .. }
            | PresenceEvent::Leave { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PresenceEvent::Join { .. } => "join",
            PresenceEvent::Update { .. } => "update",
            PresenceEvent::Leave { .. } => "leave",
        }
    }
}

/// Synthesizes the catch-up `join` for a registered participant.
impl From<&Participant> for PresenceEvent {
    fn from(participant: &Participant) -> Self {
        PresenceEvent::Join {
            id: participant.id.clone(),
            username: participant.username.clone(),
            state: participant.state.clone(),
        }
    }
}
