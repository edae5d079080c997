//! In-memory `RoomRepository` implementation.
//!
//! The `Room` entity itself is the storage, held behind a single
//! `tokio::sync::Mutex`. Every trait method takes the lock exactly once,
//! which is what makes each registry operation atomic: the capacity check,
//! the mutation and the returned snapshot all happen under the same lock
//! acquisition. Broadcast fan-out happens after the lock is released,
//! using the snapshot the operation produced.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    AdmissionSnapshot, CapacityError, ChatMessage, MessageText, Participant, ParticipantId,
    RepositoryError, Room, RoomRepository, Timestamp, TypingView, ValidationError,
};

/// In-memory room repository.
pub struct InMemoryRoomRepository {
    room: Arc<Mutex<Room>>,
}

impl InMemoryRoomRepository {
    pub fn new(room: Arc<Mutex<Room>>) -> Self {
        Self { room }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_room(&self) -> Result<Room, RepositoryError> {
        let room = self.room.lock().await;
        Ok(room.clone())
    }

    async fn admit(
        &self,
        participant: Participant,
    ) -> Result<AdmissionSnapshot, CapacityError> {
        let mut room = self.room.lock().await;
        room.admit(participant)
    }

    async fn evict(&self, participant_id: &ParticipantId) -> Vec<Participant> {
        let mut room = self.room.lock().await;
        room.evict(participant_id);
        room.occupants.clone()
    }

    async fn post_message(
        &self,
        sender: &ParticipantId,
        text: MessageText,
        now: Timestamp,
    ) -> Result<ChatMessage, ValidationError> {
        let mut room = self.room.lock().await;
        room.post_message(sender, text, now)
    }

    async fn set_typing(&self, participant_id: &ParticipantId, is_typing: bool) {
        let mut room = self.room.lock().await;
        room.set_typing(participant_id, is_typing);
    }

    async fn typing_views(&self, excluding: &ParticipantId) -> Vec<TypingView> {
        let room = self.room.lock().await;
        room.typing_views(excluding)
    }

    async fn occupants(&self) -> Vec<Participant> {
        let room = self.room.lock().await;
        room.occupants.clone()
    }

    async fn count_occupants(&self) -> usize {
        let room = self.room.lock().await;
        room.occupant_count()
    }
}
