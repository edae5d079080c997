//! Outbound delivery interface.
//!
//! The domain defines what "send this payload to that participant" means;
//! the infrastructure layer provides the WebSocket-backed implementation.
//! Each connection gets its own channel, so a slow or dead peer never
//! blocks registry operations or delivery to other recipients.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ParticipantId;

/// Per-connection outbound channel. Payloads are pre-serialized JSON; the
/// connection's writer task drains the channel in FIFO order, so each
/// recipient observes notifications in the order they were produced.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Delivery of payloads to connected participants.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a participant's outbound channel.
    async fn register(&self, participant_id: ParticipantId, sender: PusherChannel);

    /// Remove a participant's outbound channel.
    async fn unregister(&self, participant_id: &ParticipantId);

    /// Send a payload to a single participant.
    async fn push_to(
        &self,
        participant_id: &ParticipantId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Send a payload to each target, best-effort per recipient: a failed
    /// send is logged and does not abort delivery to the others.
    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
