//! WebSocket connection handlers.
//!
//! Each connection walks one lifecycle: upgraded but not yet joined, then
//! admitted (or rejected with `room_full` and closed), then active until
//! the transport goes away — at which point the participant is evicted and
//! the remaining connection is told about the new presence and typing
//! state. Eviction is idempotent, so a duplicate disconnect signal is
//! harmless.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::{
    domain::{DisplayName, MessageText, Participant, ParticipantId},
    infrastructure::dto::websocket::{
        ClientEvent, JoinedMessage, MessageBroadcast, PresenceMessage, RoomFullMessage,
        TypingMessage,
    },
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // The first frame must be a join event carrying the display name
    let Some(display_name) = await_join(&mut receiver, state.config.join_deadline).await else {
        return;
    };

    // Admission: capacity is checked atomically inside the registry
    let (tx, rx) = mpsc::unbounded_channel();
    let (participant, snapshot) = match state.join_room_usecase.execute(display_name, tx).await {
        Ok(admitted) => admitted,
        Err(e) => {
            tracing::warn!("Admission rejected: {}", e);
            let room_full_json = serde_json::to_string(&RoomFullMessage::new()).unwrap();
            let _ = sender.send(Message::Text(room_full_json.into())).await;
            let _ = sender.close().await;
            return;
        }
    };

    tracing::info!(
        "Participant '{}' ('{}') joined",
        participant.id.as_str(),
        participant.display_name.as_str()
    );

    // State replay to the newly admitted connection only
    let joined = JoinedMessage::from_snapshot(&participant.id, snapshot.clone());
    let joined_json = serde_json::to_string(&joined).unwrap();
    if let Err(e) = sender.send(Message::Text(joined_json.into())).await {
        tracing::error!(
            "Failed to send joined to '{}': {}",
            participant.id.as_str(),
            e
        );
        finalize_disconnect(&state, &participant).await;
        return;
    }

    // Presence to everyone, the newcomer included
    let presence = PresenceMessage::from_occupants(snapshot.occupants);
    let presence_json = serde_json::to_string(&presence).unwrap();
    if let Err(e) = state.join_room_usecase.broadcast_presence(&presence_json).await {
        tracing::warn!("Failed to broadcast presence: {}", e);
    }

    let participant_id = participant.id.clone();
    let state_clone = state.clone();

    // The pending typing auto-clear timer is owned here, not inside the
    // reader task: when the reader is aborted mid-loop its own cleanup
    // never runs, and a surviving timer would fire a stale clear for an
    // already-evicted participant
    let typing_clear: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::new(Mutex::new(None));

    // Task receiving events from this client
    let mut recv_task = tokio::spawn({
        let typing_clear = typing_clear.clone();
        async move {
            recv_loop(receiver, state_clone, participant_id, typing_clear).await;
        }
    });

    // Task draining the outbound channel into this client's socket
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Some(task) = typing_clear.lock().await.take() {
        task.abort();
    }

    finalize_disconnect(&state, &participant).await;
}

/// Wait for the connection's join event. Returns `None` when the
/// connection closes, errors, or misses the deadline before joining;
/// non-join events arriving early are ignored.
async fn await_join(
    receiver: &mut SplitStream<WebSocket>,
    deadline: Duration,
) -> Option<DisplayName> {
    loop {
        let frame = match tokio::time::timeout(deadline, receiver.next()).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => {
                tracing::warn!("WebSocket error before join: {}", e);
                return None;
            }
            Ok(None) => return None,
            Err(_) => {
                tracing::warn!("Connection sent no join event within {:?}", deadline);
                return None;
            }
        };

        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::Join { display_name }) => match DisplayName::new(display_name) {
                    Ok(name) => return Some(name),
                    Err(e) => {
                        tracing::warn!("Invalid display name: {}", e);
                        return None;
                    }
                },
                Ok(event) => {
                    tracing::warn!("Ignoring event before join: {:?}", event);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse event as JSON: {}", e);
                }
            },
            Message::Close(_) => return None,
            _ => {}
        }
    }
}

/// Inbound event loop for one active connection. Drives the connection's
/// typing auto-clear timer: at most one pending clear at a time, rearmed
/// on every keystroke event and aborted on the next one or on exit. The
/// timer slot is shared with `handle_socket` so it is also aborted when
/// this loop itself is cancelled.
async fn recv_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    participant_id: ParticipantId,
    typing_clear: Arc<Mutex<Option<JoinHandle<()>>>>,
) {
    loop {
        let next = match state.config.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!(
                        "Participant '{}' idle for {:?}, closing",
                        participant_id.as_str(),
                        limit
                    );
                    break;
                }
            },
            None => receiver.next().await,
        };

        let Some(frame) = next else {
            break;
        };
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Failed to parse event as JSON: {}", e);
                        continue;
                    }
                };

                match event {
                    ClientEvent::Join { .. } => {
                        tracing::warn!(
                            "Duplicate join from '{}' ignored",
                            participant_id.as_str()
                        );
                    }
                    ClientEvent::SendMessage { text } => {
                        handle_send_message(&state, &participant_id, text).await;
                    }
                    ClientEvent::SetTyping { is_typing } => {
                        let mut pending_clear = typing_clear.lock().await;
                        if let Some(task) = pending_clear.take() {
                            task.abort();
                        }
                        notify_typing(&state, &participant_id, is_typing).await;
                        if is_typing {
                            *pending_clear = Some(spawn_typing_clear(
                                state.clone(),
                                participant_id.clone(),
                                state.config.typing_clear,
                            ));
                        }
                    }
                }
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Participant '{}' requested close", participant_id.as_str());
                break;
            }
            _ => {}
        }
    }

    // A timer outliving the connection would fire a stale auto-clear
    if let Some(task) = typing_clear.lock().await.take() {
        task.abort();
    }
}

/// Spawns a task that drains the outbound channel into the WebSocket sink.
///
/// Messages from the usecases (via the registered `PusherChannel`) are
/// forwarded to this client in FIFO order, so every recipient observes
/// notifications in the order they were produced.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Validate and post a message, then broadcast the stored message to all
/// connections including the sender. Validation failures are soft: logged
/// and dropped, the connection stays open.
async fn handle_send_message(state: &Arc<AppState>, sender_id: &ParticipantId, text: String) {
    let text = match MessageText::new(text) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Rejected message from '{}': {}", sender_id.as_str(), e);
            return;
        }
    };

    match state.post_message_usecase.execute(sender_id, text).await {
        Ok(stored) => {
            let broadcast_json = serde_json::to_string(&MessageBroadcast::from(stored)).unwrap();
            if let Err(e) = state
                .post_message_usecase
                .broadcast_message(&broadcast_json)
                .await
            {
                tracing::warn!("Failed to broadcast message: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Rejected message from '{}': {}", sender_id.as_str(), e);
        }
    }
}

/// Apply a typing-flag change and push each remaining recipient its own
/// recomputed view (the changed connection gets nothing; recipients never
/// see their own flag).
async fn notify_typing(state: &Arc<AppState>, changed: &ParticipantId, is_typing: bool) {
    let views = state.set_typing_usecase.execute(changed, is_typing).await;
    for view in views {
        let typing_json = serde_json::to_string(&TypingMessage::from_view(&view)).unwrap();
        if let Err(e) = state
            .set_typing_usecase
            .push_typing(&view.participant_id, &typing_json)
            .await
        {
            tracing::warn!(
                "Failed to push typing to '{}': {}",
                view.participant_id.as_str(),
                e
            );
        }
    }
}

/// Arm the auto-clear for a typing flag: after `after` with no further
/// keystroke the flag is lowered as if the client had sent
/// `set_typing(false)`.
fn spawn_typing_clear(
    state: Arc<AppState>,
    participant_id: ParticipantId,
    after: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        tracing::debug!(
            "Auto-clearing typing flag for '{}'",
            participant_id.as_str()
        );
        notify_typing(&state, &participant_id, false).await;
    })
}

/// Evict the participant and tell the remaining connection about the new
/// presence and typing state.
async fn finalize_disconnect(state: &Arc<AppState>, participant: &Participant) {
    let remaining = state.leave_room_usecase.execute(&participant.id).await;
    tracing::info!(
        "Participant '{}' disconnected and evicted",
        participant.id.as_str()
    );

    let presence_json =
        serde_json::to_string(&PresenceMessage::from_occupants(remaining.clone())).unwrap();
    let targets: Vec<ParticipantId> = remaining.iter().map(|p| p.id.clone()).collect();
    if let Err(e) = state
        .leave_room_usecase
        .broadcast_presence(targets, &presence_json)
        .await
    {
        tracing::warn!("Failed to broadcast presence: {}", e);
    }

    // The departed connection may have held a typing flag
    for view in state.leave_room_usecase.typing_views(&participant.id).await {
        let typing_json = serde_json::to_string(&TypingMessage::from_view(&view)).unwrap();
        if let Err(e) = state
            .leave_room_usecase
            .push_typing(&view.participant_id, &typing_json)
            .await
        {
            tracing::warn!(
                "Failed to push typing to '{}': {}",
                view.participant_id.as_str(),
                e
            );
        }
    }
}
