//! Two-person realtime chat coordinator server.
//!
//! Admits up to two participants into a single room over WebSocket,
//! relays messages and typing activity between them, and broadcasts
//! presence changes.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin futari-server
//! cargo run --bin futari-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{collections::HashMap, sync::Arc, time::Duration};

use clap::Parser;
use tokio::sync::Mutex;

use futari_server::{
    domain::{Room, RoomId, Timestamp},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::{GatewayConfig, Server},
    usecase::{
        GetRoomStateUseCase, JoinRoomUseCase, LeaveRoomUseCase, PostMessageUseCase,
        SetTypingUseCase,
    },
};
use futari_shared::{
    logger::setup_logger,
    time::{SystemClock, get_unix_timestamp_millis},
};

#[derive(Parser, Debug)]
#[command(name = "futari-server")]
#[command(about = "Two-person realtime chat coordinator", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Milliseconds after the last keystroke before a typing flag is
    /// auto-cleared
    #[arg(long, default_value = "3000")]
    typing_clear_ms: u64,

    /// Close connections with no inbound traffic for this many seconds
    /// (disabled when omitted)
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Seconds a connection may sit without sending its join event
    #[arg(long, default_value = "10")]
    join_deadline_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory room, constructed at startup, torn
    //    down with the process)
    let room = Arc::new(Mutex::new(Room::new(
        RoomId::generate(),
        Timestamp::new(get_unix_timestamp_millis()),
    )));
    tracing::info!("Room {} created!", room.lock().await.id.as_str());
    let repository = Arc::new(InMemoryRoomRepository::new(room));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Create UseCases
    let clock = Arc::new(SystemClock);
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let post_message_usecase = Arc::new(PostMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock,
    ));
    let set_typing_usecase = Arc::new(SetTypingUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let get_room_state_usecase = Arc::new(GetRoomStateUseCase::new(repository.clone()));

    let config = GatewayConfig {
        typing_clear: Duration::from_millis(args.typing_clear_ms),
        idle_timeout: args.idle_timeout_secs.map(Duration::from_secs),
        join_deadline: Duration::from_secs(args.join_deadline_secs),
    };

    // 4. Create and run the server
    let server = Server::new(
        join_room_usecase,
        leave_room_usecase,
        post_message_usecase,
        set_typing_usecase,
        get_room_state_usecase,
        config,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
