//! Domain layer: value objects, entities, errors and the interfaces the
//! rest of the system is built against.
//!
//! The room is the single authority over occupancy, typing flags and the
//! message log; every mutation goes through it so the two-occupant cap is
//! enforced in exactly one place.

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{AdmissionSnapshot, ChatMessage, Participant, Room, TypingView};
pub use error::{CapacityError, MessagePushError, RepositoryError, ValidationError};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::RoomRepository;
pub use value_object::{DisplayName, MessageId, MessageText, ParticipantId, RoomId, Timestamp};
