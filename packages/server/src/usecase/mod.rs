//! UseCase layer: one struct per coordinator operation.
//!
//! Each usecase is constructed over `Arc<dyn RoomRepository>` and
//! `Arc<dyn MessagePusher>` and stays wire-format agnostic: broadcast
//! helpers take pre-serialized JSON built by the UI layer from the DTOs.

mod get_room_state;
mod join_room;
mod leave_room;
mod post_message;
mod set_typing;

pub use get_room_state::GetRoomStateUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use post_message::PostMessageUseCase;
pub use set_typing::SetTypingUseCase;
