//! Two-person realtime chat coordinator.
//!
//! The server admits at most two concurrent participants into a single
//! room, replays current state to newcomers, relays chat messages and
//! typing-activity signals between the peers, and cleans up presence and
//! typing state when a connection goes away.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
