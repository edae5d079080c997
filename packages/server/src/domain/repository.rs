//! Repository trait: the session registry's operation surface.
//!
//! The domain owns this interface and the infrastructure layer implements
//! it (dependency inversion). Implementations must make each operation
//! atomic with respect to concurrent callers — the capacity check, the
//! occupant insert and the returned snapshot form one step, so two
//! simultaneous admissions can never both observe a half-full room.

use async_trait::async_trait;

use super::entity::{AdmissionSnapshot, ChatMessage, Participant, Room, TypingView};
use super::error::{CapacityError, RepositoryError, ValidationError};
use super::value_object::{MessageText, ParticipantId, Timestamp};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Snapshot of the whole room (debug/inspection).
    async fn get_room(&self) -> Result<Room, RepositoryError>;

    /// Admit a participant under the capacity constraint. On success the
    /// returned snapshot carries the occupant list and full message log
    /// for replay to the new connection.
    async fn admit(&self, participant: Participant)
    -> Result<AdmissionSnapshot, CapacityError>;

    /// Remove an occupant and its typing flag, returning the remaining
    /// occupants. Idempotent: an unknown id is a no-op.
    async fn evict(&self, participant_id: &ParticipantId) -> Vec<Participant>;

    /// Append a message from a current occupant, assigning id and
    /// timestamp. Fails when the sender is no longer an occupant.
    async fn post_message(
        &self,
        sender: &ParticipantId,
        text: MessageText,
        now: Timestamp,
    ) -> Result<ChatMessage, ValidationError>;

    /// Update an occupant's typing flag. A no-op for non-occupants.
    async fn set_typing(&self, participant_id: &ParticipantId, is_typing: bool);

    /// Per-recipient "is anyone else typing" views for every occupant
    /// except `excluding`.
    async fn typing_views(&self, excluding: &ParticipantId) -> Vec<TypingView>;

    /// Current occupant list.
    async fn occupants(&self) -> Vec<Participant>;

    /// Current occupant count.
    async fn count_occupants(&self) -> usize;
}
