//! Error taxonomy of the coordinator.
//!
//! None of these are fatal to the process. `CapacityError` is terminal for
//! the rejected connection only; `ValidationError` is recovered locally and
//! never closes a connection; `MessagePushError` is a per-recipient
//! transport failure that is logged and never escalated.

use thiserror::Error;

/// Room admission failure: the room already holds its maximum number of
/// occupants. An existing occupant is never evicted to make space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("room is full (capacity {capacity})")]
    RoomFull { capacity: usize },
}

/// Invalid client-supplied input, or a mutation referencing a participant
/// that is no longer an occupant (e.g. the sender disconnected mid-send).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message text is empty after trimming")]
    EmptyText,
    #[error("message text exceeds {max} characters (got {got})")]
    TextTooLong { max: usize, got: usize },
    #[error("display name is empty after trimming")]
    EmptyDisplayName,
    #[error("display name exceeds {max} characters (got {got})")]
    DisplayNameTooLong { max: usize, got: usize },
    #[error("participant id is empty")]
    EmptyParticipantId,
    #[error("room id is empty")]
    EmptyRoomId,
    #[error("participant '{0}' is not a current occupant")]
    UnknownParticipant(String),
}

/// Data-store access failure behind the `RoomRepository` trait.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room not found")]
    RoomNotFound,
}

/// Failure to deliver a payload to a single connection. Delivery is
/// best-effort per recipient, so these never abort a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("participant '{0}' has no registered connection")]
    ParticipantNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
