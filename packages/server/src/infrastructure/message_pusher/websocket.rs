//! WebSocket-backed `MessagePusher` implementation.
//!
//! The WebSocket itself is created in the UI layer
//! (`src/ui/handler/websocket.rs`); this implementation only holds each
//! connection's `UnboundedSender` and uses it for delivery. Sending into
//! the channel never blocks, so a stalled peer cannot hold up a registry
//! operation — its writer task simply drains the channel whenever the
//! socket accepts more data.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, ParticipantId, PusherChannel};

/// WebSocket message pusher: participant id → outbound channel.
pub struct WebSocketMessagePusher {
    clients: Arc<Mutex<HashMap<String, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<String, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register(&self, participant_id: ParticipantId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!(
            "Participant '{}' registered to MessagePusher",
            participant_id.as_str()
        );
        clients.insert(participant_id.into_string(), sender);
    }

    async fn unregister(&self, participant_id: &ParticipantId) {
        let mut clients = self.clients.lock().await;
        clients.remove(participant_id.as_str());
        tracing::debug!(
            "Participant '{}' unregistered from MessagePusher",
            participant_id.as_str()
        );
    }

    async fn push_to(
        &self,
        participant_id: &ParticipantId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(participant_id.as_str()) {
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to participant '{}'", participant_id.as_str());
            Ok(())
        } else {
            Err(MessagePushError::ParticipantNotFound(
                participant_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(target.as_str()) {
                // Partial failure is tolerated during broadcast
                if let Err(e) = sender.send(content.to_string()) {
                    tracing::warn!(
                        "Failed to push message to participant '{}': {}",
                        target.as_str(),
                        e
                    );
                } else {
                    tracing::debug!("Broadcasted message to participant '{}'", target.as_str());
                }
            } else {
                tracing::warn!(
                    "Participant '{}' not found during broadcast, skipping",
                    target.as_str()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn create_test_pusher() -> (
        WebSocketMessagePusher,
        Arc<Mutex<HashMap<String, PusherChannel>>>,
    ) {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        let pusher = WebSocketMessagePusher::new(clients.clone());
        (pusher, clients)
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の参加者にメッセージを送信できる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = ParticipantId::generate();
        pusher.register(alice.clone(), tx).await;

        // when (操作):
        let result = pusher.push_to(&alice, "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_participant_not_found() {
        // テスト項目: 未登録の参加者への送信はエラーを返す
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let stranger = ParticipantId::generate();

        // when (操作):
        let result = pusher.push_to(&stranger, "Hello").await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(MessagePushError::ParticipantNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_push_to_closed_channel_fails() {
        // テスト項目: 受信側が閉じたチャンネルへの送信はエラーを返す
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let alice = ParticipantId::generate();
        pusher.register(alice.clone(), tx).await;

        // when (操作):
        let result = pusher.push_to(&alice, "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn test_broadcast_success() {
        // テスト項目: 複数の参加者にメッセージをブロードキャストできる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let alice = ParticipantId::generate();
        let bob = ParticipantId::generate();
        pusher.register(alice.clone(), tx1).await;
        pusher.register(bob.clone(), tx2).await;

        // when (操作):
        let result = pusher.broadcast(vec![alice, bob], "Broadcast message").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("Broadcast message".to_string()));
        assert_eq!(rx2.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 一部の参加者が未登録でもブロードキャストは成功する
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let alice = ParticipantId::generate();
        let gone = ParticipantId::generate();
        pusher.register(alice.clone(), tx1).await;

        // when (操作):
        let result = pusher
            .broadcast(vec![alice, gone], "Broadcast message")
            .await;

        // then (期待する結果): ブロードキャストは部分失敗を許容
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();

        // when (操作):
        let result = pusher.broadcast(vec![], "Message").await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unregister_removes_channel() {
        // テスト項目: 登録解除後はその参加者に送信できない
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();
        let alice = ParticipantId::generate();
        pusher.register(alice.clone(), tx).await;

        // when (操作):
        pusher.unregister(&alice).await;
        let result = pusher.push_to(&alice, "Hello").await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(MessagePushError::ParticipantNotFound(_))
        ));
    }
}
