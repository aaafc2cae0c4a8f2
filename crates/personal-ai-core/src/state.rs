//! UI-agnostic chat state types
//!
//! Shared between the chat session and whatever renders it. Nothing here is
//! persisted; the transcript lives only as long as the session.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp,
        }
    }

    pub fn ai(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Ai,
            timestamp,
        }
    }

    /// Local wall-clock time, "HH:MM".
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}
