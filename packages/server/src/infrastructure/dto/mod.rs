//! Data Transfer Objects for the wire protocol.
//!
//! - `websocket`: JSON event DTOs exchanged over the WebSocket
//! - `conversion`: domain entity ↔ DTO conversions

pub mod conversion;
pub mod websocket;
