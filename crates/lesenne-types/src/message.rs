use serde::{Deserialize, Serialize};

/// A single turn in a conversation thread.
///
/// Exactly two roles exist: the user's question and the assistant's answer.
/// Messages are immutable once appended to a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    #[serde(rename = "user")]
    Human { content: String },

    #[serde(rename = "assistant")]
    AI { content: String },
}

impl Message {
    /// Create a user message
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn ai(content: impl Into<String>) -> Self {
        Self::AI {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Human { content } => content,
            Self::AI { content } => content,
        }
    }

    /// Get role as string
    pub fn role(&self) -> &str {
        match self {
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Self::Human { .. })
    }
}
