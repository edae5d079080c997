//! UseCase: 退室処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - 退室処理（occupants / typing フラグの削除、チャンネル登録解除）
//!
//! ### なぜこのテストが必要か
//! - 冪等性の検証：重複した切断シグナルが無害であること
//! - 退室時に typing フラグが残らないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の退室と残り参加者への通知
//! - エッジケース：最後の参加者の退室、未知の id での退室

use std::sync::Arc;

use crate::domain::{
    MessagePushError, MessagePusher, Participant, ParticipantId, RoomRepository, TypingView,
};

/// 退室のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 退室を実行
    ///
    /// Evicts the participant (occupant entry and typing flag) and drops
    /// its outbound channel. Idempotent: a duplicate disconnect signal or
    /// an unknown id leaves the room untouched.
    ///
    /// # Returns
    ///
    /// The remaining occupants, for the presence broadcast.
    pub async fn execute(&self, participant_id: &ParticipantId) -> Vec<Participant> {
        let remaining = self.repository.evict(participant_id).await;
        self.message_pusher.unregister(participant_id).await;
        remaining
    }

    /// 残り参加者ごとの typing ビューを再計算
    ///
    /// Eviction may have removed a typing flag, so the remaining
    /// connections need their "is anyone else typing" view refreshed.
    pub async fn typing_views(&self, excluding: &ParticipantId) -> Vec<TypingView> {
        self.repository.typing_views(excluding).await
    }

    /// presence を残りの参加者にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `targets` - ブロードキャスト対象の参加者 ID リスト
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_presence(
        &self,
        targets: Vec<ParticipantId>,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.broadcast(targets, message).await
    }

    /// typing ビューを特定の参加者に送信
    pub async fn push_typing(
        &self,
        target: &ParticipantId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(target, message).await
    }
}
