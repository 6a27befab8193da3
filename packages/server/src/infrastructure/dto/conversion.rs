//! Conversion logic between DTOs and domain types.

use relay_shared::time::timestamp_to_rfc3339;

use crate::domain::{Participant, ParticipantId, ParticipantState, PresenceEvent, Username};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::EventMessage> for PresenceEvent {
    type Error = dto::DecodeError;

    fn try_from(message: dto::EventMessage) -> Result<Self, Self::Error> {
        let participant_id = |id: String| {
            ParticipantId::new(id).map_err(|e| dto::DecodeError::InvalidPayload(e.to_string()))
        };

        Ok(match message {
            dto::EventMessage::Join {
                id,
                username,
                state,
            } => PresenceEvent::Join {
                id: participant_id(id)?,
                username: Username::new(username),
                state: ParticipantState::new(state),
            },
            dto::EventMessage::Update { id, state } => PresenceEvent::Update {
                id: participant_id(id)?,
                state: ParticipantState::new(state),
            },
            dto::EventMessage::Leave { id } => PresenceEvent::Leave {
                id: participant_id(id)?,
            },
        })
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&PresenceEvent> for dto::EventMessage {
    fn from(event: &PresenceEvent) -> Self {
        match event {
            PresenceEvent::Join {
                id,
                username,
                state,
            } => dto::EventMessage::Join {
                id: id.as_str().to_string(),
                username: username.as_str().to_string(),
                state: state.as_value().clone(),
            },
            PresenceEvent::Update { id, state } => dto::EventMessage::Update {
                id: id.as_str().to_string(),
                state: state.as_value().clone(),
            },
            PresenceEvent::Leave { id } => dto::EventMessage::Leave {
                id: id.as_str().to_string(),
            },
        }
    }
}

impl From<Participant> for http::ParticipantDto {
    fn from(participant: Participant) -> Self {
        Self {
            id: participant.id.into_string(),
            username: participant.username.into_string(),
            state: participant.state.into_value(),
            joined_at: timestamp_to_rfc3339(participant.joined_at.value()),
        }
    }
}
