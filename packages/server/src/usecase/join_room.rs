//! UseCase: 入室処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 入室処理（定員チェック、スナップショット取得、チャンネル登録）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：2 人定員の厳守（既存参加者を追い出さない）
//! - 新規参加者へのリプレイ用スナップショットが正しく返されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：1 人目・2 人目の入室
//! - 異常系：満室時の 3 人目の入室試行

use std::sync::Arc;

use futari_shared::time::Clock;

use crate::domain::{
    AdmissionSnapshot, CapacityError, DisplayName, MessagePushError, MessagePusher, Participant,
    ParticipantId, PusherChannel, RoomRepository, Timestamp,
};

/// 入室のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
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

    /// 入室を実行
    ///
    /// Generates a fresh participant id, registers the connection's
    /// outbound channel, then admits it atomically under the capacity
    /// constraint. The channel is registered first: the moment the
    /// occupant list contains the newcomer, a concurrent broadcast must
    /// find its channel, or the notification would be lost (it is also
    /// absent from the replay snapshot taken at admission). On
    /// `CapacityError` the channel is unregistered again and existing
    /// occupants are untouched.
    ///
    /// # Returns
    ///
    /// * `Ok((Participant, AdmissionSnapshot))` - the new identity plus the
    ///   state to replay to this connection
    /// * `Err(CapacityError)` - the room already holds two occupants
    pub async fn execute(
        &self,
        display_name: DisplayName,
        sender: PusherChannel,
    ) -> Result<(Participant, AdmissionSnapshot), CapacityError> {
        let participant = Participant::new(
            ParticipantId::generate(),
            display_name,
            Timestamp::new(self.clock.now_millis()),
        );

        self.message_pusher
            .register(participant.id.clone(), sender)
            .await;

        match self.repository.admit(participant.clone()).await {
            Ok(snapshot) => Ok((participant, snapshot)),
            Err(e) => {
                self.message_pusher.unregister(&participant.id).await;
                Err(e)
            }
        }
    }

    /// 入室後の presence を全参加者にブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_presence(&self, message: &str) -> Result<(), MessagePushError> {
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
