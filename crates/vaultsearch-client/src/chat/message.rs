//! Transcript data model.

use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One committed transcript entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The one not-yet-committed assistant answer, alive only while a chat
/// request is outstanding. Promoted to a [`Message`] on clean stream end,
/// folded into the error entry otherwise.
#[derive(Debug, Clone)]
pub struct StreamingDraft {
    /// Accumulated answer text, in delta arrival order.
    pub content: String,
    /// True while the producing stream is still delivering.
    pub open: bool,
}

impl StreamingDraft {
    pub(crate) fn new() -> Self {
        Self {
            content: String::new(),
            open: true,
        }
    }
}
