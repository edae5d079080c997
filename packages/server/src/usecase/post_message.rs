//! UseCase: メッセージ投稿処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PostMessageUseCase::execute() メソッド
//! - メッセージ投稿処理（送信者の在室チェック、ログへの追記、全員への配信）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：送信者を含む全参加者に配信される
//!   （送信者も同じブロードキャストで自分のメッセージを受け取る設計）
//! - 退室済み送信者からの投稿が拒否されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ投稿と全員への配信
//! - 異常系：退室済み参加者からの投稿（送信中切断の競合）

use std::sync::Arc;

use futari_shared::time::Clock;

use crate::domain::{
    ChatMessage, MessagePushError, MessagePusher, MessageText, ParticipantId, RoomRepository,
    Timestamp, ValidationError,
};

/// メッセージ投稿のユースケース
pub struct PostMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl PostMessageUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// メッセージ投稿を実行
    ///
    /// Appends the message atomically, with id and timestamp assigned by
    /// the room. Fails when the sender is no longer an occupant; the
    /// failure is recoverable — the caller logs it and keeps the
    /// connection open.
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - the stored message, for the broadcast payload
    /// * `Err(ValidationError)` - sender is not a current occupant
    pub async fn execute(
        &self,
        sender: &ParticipantId,
        text: MessageText,
    ) -> Result<ChatMessage, ValidationError> {
        let now = Timestamp::new(self.clock.now_millis());
        self.repository.post_message(sender, text, now).await
    }

    /// 保存済みメッセージを全参加者（送信者を含む）にブロードキャスト
    ///
    /// The sender receives its own message through the same channel as
    /// everyone else, so all connections observe one consistent ordering.
    ///
    /// # Arguments
    ///
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_message(&self, message: &str) -> Result<(), MessagePushError> {
        let targets: Vec<ParticipantId> = self
            .repository
            .occupants()
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();

        self.message_pusher.broadcast(targets, message).await
    }
}
