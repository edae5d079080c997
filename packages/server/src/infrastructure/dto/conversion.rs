//! Conversion logic between DTOs and domain entities.

use crate::domain::entity;
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<entity::Participant> for dto::OccupantInfo {
    fn from(model: entity::Participant) -> Self {
        Self {
            participant_id: model.id.into_string(),
            display_name: model.display_name.into_string(),
        }
    }
}

impl From<entity::ChatMessage> for dto::MessageInfo {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            id: model.id.value(),
            participant_id: model.sender.into_string(),
            display_name: model.display_name.into_string(),
            text: model.text.into_string(),
            created_at: model.created_at.value(),
        }
    }
}

impl From<entity::ChatMessage> for dto::MessageBroadcast {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            r#type: dto::MessageType::Message,
            message: model.into(),
        }
    }
}

impl dto::JoinedMessage {
    /// Build the one-time replay payload for a newly admitted connection.
    pub fn from_snapshot(
        participant_id: &crate::domain::ParticipantId,
        snapshot: entity::AdmissionSnapshot,
    ) -> Self {
        Self {
            r#type: dto::MessageType::Joined,
            participant_id: participant_id.as_str().to_string(),
            occupants: snapshot.occupants.into_iter().map(Into::into).collect(),
            messages: snapshot.messages.into_iter().map(Into::into).collect(),
        }
    }
}

impl dto::PresenceMessage {
    pub fn from_occupants(occupants: Vec<entity::Participant>) -> Self {
        Self {
            r#type: dto::MessageType::Presence,
            occupants: occupants.into_iter().map(Into::into).collect(),
        }
    }
}

impl dto::TypingMessage {
    pub fn from_view(view: &entity::TypingView) -> Self {
        Self {
            r#type: dto::MessageType::Typing,
            others_typing: view.others_typing,
        }
    }
}
