//! Domain entities: `Room`, `Participant`, `ChatMessage`.
//!
//! `Room` is the single authority over occupancy, typing flags and the
//! message log. Its methods are pure and synchronous; atomicity against
//! concurrent callers is provided one layer up by the in-memory repository,
//! which runs each operation under a single lock.

use std::collections::HashSet;

use serde::Serialize;

use super::error::{CapacityError, ValidationError};
use super::value_object::{
    DisplayName, MessageId, MessageText, ParticipantId, RoomId, Timestamp,
};

/// Hard cap on concurrent occupants. A third admission is rejected, never
/// traded against an existing occupant.
pub const ROOM_OCCUPANT_CAPACITY: usize = 2;

/// A connected occupant of the room. Ephemeral: exists only for the
/// duration of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: DisplayName,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(id: ParticipantId, display_name: DisplayName, joined_at: Timestamp) -> Self {
        Self {
            id,
            display_name,
            joined_at,
        }
    }
}

/// A chat message, immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: ParticipantId,
    pub display_name: DisplayName,
    pub text: MessageText,
    pub created_at: Timestamp,
}

/// State returned by a successful admission, for replay to the new
/// connection: the occupant list (including the newcomer) and the full
/// message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionSnapshot {
    pub occupants: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
}

/// One recipient's recomputed "is anyone else typing" view. The
/// recipient's own flag is excluded by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingView {
    pub participant_id: ParticipantId,
    pub others_typing: bool,
}

/// The chat room: occupants, ephemeral typing flags and the append-only
/// message log.
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub occupants: Vec<Participant>,
    /// Participant ids currently flagged as typing. Ephemeral: cleared on
    /// stop-typing and on eviction, never stored with the message log.
    pub typing: HashSet<ParticipantId>,
    pub messages: Vec<ChatMessage>,
    pub created_at: Timestamp,
    occupant_capacity: usize,
    /// Last assigned message id, for monotonic assignment within a
    /// millisecond.
    last_message_id: i64,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self::with_capacity(id, created_at, ROOM_OCCUPANT_CAPACITY)
    }

    /// Construct a room with a non-default occupant capacity (tests only in
    /// practice).
    pub fn with_capacity(id: RoomId, created_at: Timestamp, occupant_capacity: usize) -> Self {
        Self {
            id,
            occupants: Vec::new(),
            typing: HashSet::new(),
            messages: Vec::new(),
            created_at,
            occupant_capacity,
            last_message_id: 0,
        }
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_occupant(&self, id: &ParticipantId) -> bool {
        self.occupants.iter().any(|p| &p.id == id)
    }

    /// Admit a participant, or reject with `CapacityError::RoomFull` when
    /// the room already holds its maximum number of occupants. On success
    /// returns the snapshot to replay to the new connection.
    pub fn admit(&mut self, participant: Participant) -> Result<AdmissionSnapshot, CapacityError> {
        if self.occupants.len() >= self.occupant_capacity {
            return Err(CapacityError::RoomFull {
                capacity: self.occupant_capacity,
            });
        }
        self.occupants.push(participant);
        Ok(AdmissionSnapshot {
            occupants: self.occupants.clone(),
            messages: self.messages.clone(),
        })
    }

    /// Remove an occupant and any typing flag for that id. Idempotent:
    /// evicting an unknown id is a no-op, which makes duplicate disconnect
    /// signals harmless.
    pub fn evict(&mut self, id: &ParticipantId) {
        self.occupants.retain(|p| &p.id != id);
        self.typing.remove(id);
    }

    /// Append a message from a current occupant. The id is derived from
    /// the creation timestamp and bumped past the previous id, so two
    /// messages in the same millisecond keep their insertion order.
    pub fn post_message(
        &mut self,
        sender: &ParticipantId,
        text: MessageText,
        now: Timestamp,
    ) -> Result<ChatMessage, ValidationError> {
        let display_name = match self.occupants.iter().find(|p| &p.id == sender) {
            Some(participant) => participant.display_name.clone(),
            None => {
                return Err(ValidationError::UnknownParticipant(
                    sender.as_str().to_string(),
                ));
            }
        };

        let id = now.value().max(self.last_message_id + 1);
        self.last_message_id = id;

        let message = ChatMessage {
            id: MessageId::new(id),
            sender: sender.clone(),
            display_name,
            text,
            created_at: now,
        };
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Update an occupant's typing flag. A no-op for ids that are not
    /// current occupants (e.g. a stale auto-clear firing after eviction).
    pub fn set_typing(&mut self, id: &ParticipantId, is_typing: bool) {
        if !self.is_occupant(id) {
            return;
        }
        if is_typing {
            self.typing.insert(id.clone());
        } else {
            self.typing.remove(id);
        }
    }

    /// Whether anyone other than `viewer` is currently typing.
    pub fn others_typing(&self, viewer: &ParticipantId) -> bool {
        self.typing.iter().any(|id| id != viewer)
    }

    /// Per-recipient typing views for every occupant except `excluding`
    /// (the connection whose flag just changed does not get an update).
    pub fn typing_views(&self, excluding: &ParticipantId) -> Vec<TypingView> {
        self.occupants
            .iter()
            .filter(|p| &p.id != excluding)
            .map(|p| TypingView {
                participant_id: p.id.clone(),
                others_typing: self.others_typing(&p.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_room() -> Room {
        Room::new(RoomId::generate(), Timestamp::new(1_000))
    }

    fn test_participant(name: &str) -> Participant {
        Participant::new(
            ParticipantId::generate(),
            DisplayName::new(name.to_string()).unwrap(),
            Timestamp::new(1_000),
        )
    }

    #[test]
    fn test_admit_first_two_participants() {
        // テスト項目: 2 人までの参加者が正常に入室できる
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        let bob = test_participant("Bob");

        // when (操作):
        let snapshot_alice = room.admit(alice.clone()).unwrap();
        let snapshot_bob = room.admit(bob.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(snapshot_alice.occupants, vec![alice.clone()]);
        assert_eq!(snapshot_bob.occupants, vec![alice, bob]);
        assert_eq!(room.occupant_count(), 2);
    }

    #[test]
    fn test_admit_third_participant_is_rejected() {
        // テスト項目: 3 人目の入室が拒否され、既存の参加者は退室させられない
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        let bob = test_participant("Bob");
        room.admit(alice.clone()).unwrap();
        room.admit(bob.clone()).unwrap();

        // when (操作):
        let carol = test_participant("Carol");
        let result = room.admit(carol);

        // then (期待する結果):
        assert_eq!(result, Err(CapacityError::RoomFull { capacity: 2 }));
        assert_eq!(room.occupants, vec![alice, bob]);
    }

    #[test]
    fn test_admit_after_eviction_succeeds() {
        // テスト項目: 退室後に新しい参加者が入室できる
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        let bob = test_participant("Bob");
        room.admit(alice.clone()).unwrap();
        room.admit(bob).unwrap();
        room.evict(&alice.id);

        // when (操作):
        let carol = test_participant("Carol");
        let result = room.admit(carol);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(room.occupant_count(), 2);
    }

    #[test]
    fn test_admission_snapshot_includes_message_log() {
        // テスト項目: 入室時のスナップショットにメッセージログ全体が含まれる
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        room.admit(alice.clone()).unwrap();
        room.post_message(
            &alice.id,
            MessageText::new("hi".to_string()).unwrap(),
            Timestamp::new(2_000),
        )
        .unwrap();

        // when (操作):
        let bob = test_participant("Bob");
        let snapshot = room.admit(bob).unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].text.as_str(), "hi");
    }

    #[test]
    fn test_evict_is_idempotent() {
        // テスト項目: 同じ id での退室を 2 回呼んでも、未知の id でも状態が変わらない
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        let bob = test_participant("Bob");
        room.admit(alice.clone()).unwrap();
        room.admit(bob.clone()).unwrap();

        // when (操作):
        room.evict(&alice.id);
        let after_first = room.occupants.clone();
        room.evict(&alice.id);
        room.evict(&ParticipantId::generate());

        // then (期待する結果):
        assert_eq!(room.occupants, after_first);
        assert_eq!(room.occupants, vec![bob]);
    }

    #[test]
    fn test_evict_clears_typing_flag() {
        // テスト項目: 退室時にその参加者の typing フラグも削除される
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        let bob = test_participant("Bob");
        room.admit(alice.clone()).unwrap();
        room.admit(bob.clone()).unwrap();
        room.set_typing(&alice.id, true);
        assert!(room.typing.contains(&alice.id));

        // when (操作):
        room.evict(&alice.id);

        // then (期待する結果):
        assert!(!room.typing.contains(&alice.id));
        assert_eq!(room.occupants, vec![bob.clone()]);
        assert!(!room.others_typing(&bob.id));
    }

    #[test]
    fn test_post_message_appends_in_call_order() {
        // テスト項目: メッセージが呼び出し順に追記される
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        room.admit(alice.clone()).unwrap();

        // when (操作):
        room.post_message(
            &alice.id,
            MessageText::new("first".to_string()).unwrap(),
            Timestamp::new(2_000),
        )
        .unwrap();
        room.post_message(
            &alice.id,
            MessageText::new("second".to_string()).unwrap(),
            Timestamp::new(3_000),
        )
        .unwrap();

        // then (期待する結果):
        assert_eq!(room.messages.len(), 2);
        assert_eq!(room.messages[0].text.as_str(), "first");
        assert_eq!(room.messages[1].text.as_str(), "second");
    }

    #[test]
    fn test_post_message_from_unknown_participant_is_rejected() {
        // テスト項目: 参加者でない id からの送信が拒否され、ログに追記されない
        // given (前提条件):
        let mut room = test_room();
        let stranger = ParticipantId::generate();

        // when (操作):
        let result = room.post_message(
            &stranger,
            MessageText::new("hi".to_string()).unwrap(),
            Timestamp::new(2_000),
        );

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValidationError::UnknownParticipant(
                stranger.as_str().to_string()
            ))
        );
        assert!(room.messages.is_empty());
    }

    #[test]
    fn test_post_message_carries_sender_display_name() {
        // テスト項目: 保存されたメッセージに送信者の表示名が含まれる
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        room.admit(alice.clone()).unwrap();

        // when (操作):
        let message = room
            .post_message(
                &alice.id,
                MessageText::new("hi".to_string()).unwrap(),
                Timestamp::new(2_000),
            )
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.sender, alice.id);
        assert_eq!(message.display_name.as_str(), "Alice");
        assert_eq!(message.created_at, Timestamp::new(2_000));
    }

    #[test]
    fn test_message_ids_are_monotonic_within_same_millisecond() {
        // テスト項目: 同一ミリ秒内の連続投稿でも id が単調増加する
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        room.admit(alice.clone()).unwrap();
        let now = Timestamp::new(5_000);

        // when (操作):
        let msg1 = room
            .post_message(
                &alice.id,
                MessageText::new("one".to_string()).unwrap(),
                now,
            )
            .unwrap();
        let msg2 = room
            .post_message(
                &alice.id,
                MessageText::new("two".to_string()).unwrap(),
                now,
            )
            .unwrap();

        // then (期待する結果):
        assert!(msg2.id > msg1.id);
        assert_eq!(msg1.id.value(), 5_000);
        assert_eq!(msg2.id.value(), 5_001);
    }

    #[test]
    fn test_set_typing_round_trip_restores_prior_state() {
        // テスト項目: set_typing(true) の後の set_typing(false) で元の状態に戻る
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        room.admit(alice.clone()).unwrap();
        let before = room.typing.clone();

        // when (操作):
        room.set_typing(&alice.id, true);
        room.set_typing(&alice.id, false);

        // then (期待する結果):
        assert_eq!(room.typing, before);
    }

    #[test]
    fn test_set_typing_ignores_non_occupant() {
        // テスト項目: 参加者でない id の set_typing が無視される
        // given (前提条件):
        let mut room = test_room();
        let stranger = ParticipantId::generate();

        // when (操作):
        room.set_typing(&stranger, true);

        // then (期待する結果):
        assert!(room.typing.is_empty());
    }

    #[test]
    fn test_others_typing_excludes_viewer_own_flag() {
        // テスト項目: others_typing が閲覧者自身のフラグを除外する
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        let bob = test_participant("Bob");
        room.admit(alice.clone()).unwrap();
        room.admit(bob.clone()).unwrap();

        // when (操作):
        room.set_typing(&alice.id, true);

        // then (期待する結果):
        assert!(room.others_typing(&bob.id));
        assert!(!room.others_typing(&alice.id));
    }

    #[test]
    fn test_typing_views_exclude_the_changed_connection() {
        // テスト項目: typing_views がフラグを変更した参加者自身を含まない
        // given (前提条件):
        let mut room = test_room();
        let alice = test_participant("Alice");
        let bob = test_participant("Bob");
        room.admit(alice.clone()).unwrap();
        room.admit(bob.clone()).unwrap();
        room.set_typing(&alice.id, true);

        // when (操作):
        let views = room.typing_views(&alice.id);

        // then (期待する結果):
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].participant_id, bob.id);
        assert!(views[0].others_typing);
    }
}
