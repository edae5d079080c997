//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    GetRoomStateUseCase, JoinRoomUseCase, LeaveRoomUseCase, PostMessageUseCase, SetTypingUseCase,
};

use super::{
    handler::{
        http::{debug_room_state, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::{AppState, GatewayConfig},
};

/// Two-person chat coordinator server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_room_usecase,
///     leave_room_usecase,
///     post_message_usecase,
///     set_typing_usecase,
///     get_room_state_usecase,
///     GatewayConfig::default(),
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// JoinRoomUseCase（入室のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（退室のユースケース）
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// PostMessageUseCase（メッセージ投稿のユースケース）
    post_message_usecase: Arc<PostMessageUseCase>,
    /// SetTypingUseCase（typing フラグ更新のユースケース）
    set_typing_usecase: Arc<SetTypingUseCase>,
    /// GetRoomStateUseCase（ルーム状態取得のユースケース）
    get_room_state_usecase: Arc<GetRoomStateUseCase>,
    /// Gateway 設定
    config: GatewayConfig,
}

impl Server {
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        post_message_usecase: Arc<PostMessageUseCase>,
        set_typing_usecase: Arc<SetTypingUseCase>,
        get_room_state_usecase: Arc<GetRoomStateUseCase>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            join_room_usecase,
            leave_room_usecase,
            post_message_usecase,
            set_typing_usecase,
            get_room_state_usecase,
            config,
        }
    }

    /// Run the chat coordinator server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified
    /// address or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            join_room_usecase: self.join_room_usecase,
            leave_room_usecase: self.leave_room_usecase,
            post_message_usecase: self.post_message_usecase,
            set_typing_usecase: self.set_typing_usecase,
            get_room_state_usecase: self.get_room_state_usecase,
            config: self.config,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/debug/room", get(debug_room_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!("Chat coordinator listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
