//! UseCase: typing フラグ更新処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SetTypingUseCase::execute() メソッド
//! - typing フラグの更新と受信者ごとのビュー再計算
//!
//! ### なぜこのテストが必要か
//! - 自己除外の検証：各受信者のビューから自分自身のフラグが除外される
//! - フラグを変更した本人には通知が送られないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：typing on/off とビューの再計算
//! - エッジケース：退室済み参加者からの遅延した auto-clear（no-op）

use std::sync::Arc;

use crate::domain::{MessagePushError, MessagePusher, ParticipantId, RoomRepository, TypingView};

/// typing フラグ更新のユースケース
pub struct SetTypingUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SetTypingUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// typing フラグを更新し、通知対象ごとのビューを返す
    ///
    /// A no-op for non-occupants (e.g. an auto-clear firing after the
    /// participant was already evicted). The returned views cover every
    /// occupant except the one whose flag changed — each with its own flag
    /// excluded, so a recipient never sees itself as "someone else".
    pub async fn execute(
        &self,
        participant_id: &ParticipantId,
        is_typing: bool,
    ) -> Vec<TypingView> {
        self.repository.set_typing(participant_id, is_typing).await;
        self.repository.typing_views(participant_id).await
    }

    /// typing ビューを特定の参加者に送信
    ///
    /// # Arguments
    ///
    /// * `target` - 送信先の参加者 ID
    /// * `message` - 送信するメッセージ（JSON）
    pub async fn push_typing(
        &self,
        target: &ParticipantId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(target, message).await
    }
}
