//! Value objects with validating constructors.
//!
//! Invalid values are unrepresentable past construction: a `MessageText`
//! is never empty after trimming, a `DisplayName` is always 1..=32 chars.

use serde::Serialize;
use uuid::Uuid;

use super::error::ValidationError;

/// Maximum display name length in characters, after trimming.
pub const MAX_DISPLAY_NAME_CHARS: usize = 32;

/// Maximum message text length in characters, after trimming.
pub const MAX_MESSAGE_TEXT_CHARS: usize = 500;

/// Ephemeral identity of one connection. Unique per connection, never
/// reused (v4 UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyParticipantId);
        }
        Ok(Self(value))
    }

    /// Generate a fresh participant id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Client-supplied display name, trimmed, 1..=32 characters. Trusted as-is
/// beyond that (no identity verification in this system).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDisplayName);
        }
        let chars = trimmed.chars().count();
        if chars > MAX_DISPLAY_NAME_CHARS {
            return Err(ValidationError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_CHARS,
                got: chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Chat message body, trimmed, non-empty, at most 500 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let chars = trimmed.chars().count();
        if chars > MAX_MESSAGE_TEXT_CHARS {
            return Err(ValidationError::TextTooLong {
                max: MAX_MESSAGE_TEXT_CHARS,
                got: chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Message identifier: creation-time-derived (Unix millis), assigned
/// monotonically by the room so insertion order and id order agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Room identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyRoomId);
        }
        Ok(Self(value))
    }

    /// Generate a fresh room id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
