//! Shared utilities for the futari chat coordinator.
//!
//! Everything here is infrastructure-neutral: logging setup and time
//! utilities used by both the server crate and its tests.

pub mod logger;
pub mod time;
