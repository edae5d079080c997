//! Server state and gateway configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::usecase::{
    GetRoomStateUseCase, JoinRoomUseCase, LeaveRoomUseCase, PostMessageUseCase, SetTypingUseCase,
};

/// Gateway behaviour knobs, owned by the connection handlers (not the
/// registry).
#[derive(Debug, Clone, Copy)]
pub struct GatewayConfig {
    /// How long after the last keystroke a typing flag is auto-cleared.
    pub typing_clear: Duration,
    /// Close connections with no inbound traffic for this long. None by
    /// default; enforcement is left to the deployment.
    pub idle_timeout: Option<Duration>,
    /// How long a connection may sit without sending its join event.
    pub join_deadline: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            typing_clear: Duration::from_secs(3),
            idle_timeout: None,
            join_deadline: Duration::from_secs(10),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（入室のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（退室のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// PostMessageUseCase（メッセージ投稿のユースケース）
    pub post_message_usecase: Arc<PostMessageUseCase>,
    /// SetTypingUseCase（typing フラグ更新のユースケース）
    pub set_typing_usecase: Arc<SetTypingUseCase>,
    /// GetRoomStateUseCase（ルーム状態取得のユースケース）
    pub get_room_state_usecase: Arc<GetRoomStateUseCase>,
    /// Gateway 設定
    pub config: GatewayConfig,
}
