//! WebSocket event DTOs.
//!
//! Client→server events are one internally tagged enum (`"type"` field);
//! server→client events are one struct per event, each carrying its
//! `MessageType` discriminant so the client can dispatch on `"type"`.

use serde::{Deserialize, Serialize};

/// Client→server events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Initiates admission; must be the first event on a connection.
    Join { display_name: String },
    /// Post a chat message.
    SendMessage { text: String },
    /// Flag or unflag typing activity.
    SetTyping { is_typing: bool },
}

/// Discriminant for server→client events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Joined,
    RoomFull,
    Message,
    Presence,
    Typing,
}

/// One occupant as seen on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantInfo {
    pub participant_id: String,
    pub display_name: String,
}

/// One stored chat message as seen on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub id: i64,
    pub participant_id: String,
    pub display_name: String,
    pub text: String,
    pub created_at: i64,
}

/// Sent once to a newly admitted connection: its identity plus the state
/// replay (current occupants and full message log).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedMessage {
    pub r#type: MessageType,
    pub participant_id: String,
    pub occupants: Vec<OccupantInfo>,
    pub messages: Vec<MessageInfo>,
}

/// Sent once to a rejected connection, followed by close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomFullMessage {
    pub r#type: MessageType,
}

impl RoomFullMessage {
    pub fn new() -> Self {
        Self {
            r#type: MessageType::RoomFull,
        }
    }
}

impl Default for RoomFullMessage {
    fn default() -> Self {
        Self::new()
    }
}

/// Broadcast to all connections on a successful post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBroadcast {
    pub r#type: MessageType,
    #[serde(flatten)]
    pub message: MessageInfo,
}

/// Broadcast to all connections on any admission or eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceMessage {
    pub r#type: MessageType,
    pub occupants: Vec<OccupantInfo>,
}

/// Sent per-recipient; `others_typing` excludes the recipient's own flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingMessage {
    pub r#type: MessageType,
    pub others_typing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_join_deserializes() {
        // テスト項目: join イベントの JSON が正しくパースされる
        // given (前提条件):
        let json = r#"{"type":"join","display_name":"Alice"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::Join {
                display_name: "Alice".to_string()
            }
        );
    }

    #[test]
    fn test_client_event_send_message_deserializes() {
        // テスト項目: send_message イベントの JSON が正しくパースされる
        // given (前提条件):
        let json = r#"{"type":"send_message","text":"hi"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::SendMessage {
                text: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_client_event_set_typing_deserializes() {
        // テスト項目: set_typing イベントの JSON が正しくパースされる
        // given (前提条件):
        let json = r#"{"type":"set_typing","is_typing":true}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(event, ClientEvent::SetTyping { is_typing: true });
    }

    #[test]
    fn test_client_event_unknown_type_is_rejected() {
        // テスト項目: 未知のイベント種別がパースエラーになる
        // given (前提条件):
        let json = r#"{"type":"shout","text":"HI"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_room_full_message_serializes_with_type_tag() {
        // テスト項目: room_full イベントが type タグ付きでシリアライズされる
        // given (前提条件):
        let msg = RoomFullMessage::new();

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"room_full"}"#);
    }

    #[test]
    fn test_message_broadcast_flattens_message_fields() {
        // テスト項目: message イベントのフィールドがトップレベルに展開される
        // given (前提条件):
        let msg = MessageBroadcast {
            r#type: MessageType::Message,
            message: MessageInfo {
                id: 1000,
                participant_id: "p-1".to_string(),
                display_name: "Alice".to_string(),
                text: "hi".to_string(),
                created_at: 1000,
            },
        };

        // when (操作):
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(value["type"], "message");
        assert_eq!(value["text"], "hi");
        assert_eq!(value["participant_id"], "p-1");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_typing_message_serializes() {
        // テスト項目: typing イベントが正しくシリアライズされる
        // given (前提条件):
        let msg = TypingMessage {
            r#type: MessageType::Typing,
            others_typing: true,
        };

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"typing","others_typing":true}"#);
    }
}
