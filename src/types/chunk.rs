//! Decoded units of the chat event stream

use serde::{Deserialize, Serialize};

/// One decoded chat stream chunk.
///
/// The wire payload is `{ "type": "thought" | "text" | "phase_complete",
/// "content"?: string }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Chunk {
    /// Incremental reasoning text
    Thought {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// Incremental answer text
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// The backend finished the current drafting phase
    PhaseComplete,
}

impl Chunk {
    /// Every wire `type` value.
    pub const KINDS: [&'static str; 3] = ["thought", "text", "phase_complete"];

    pub fn thought(content: impl Into<String>) -> Self {
        Chunk::Thought {
            content: Some(content.into()),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Chunk::Text {
            content: Some(content.into()),
        }
    }

    /// Wire name of this chunk's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Chunk::Thought { .. } => "thought",
            Chunk::Text { .. } => "text",
            Chunk::PhaseComplete => "phase_complete",
        }
    }

    /// Text payload, if this kind carries one.
    pub fn content(&self) -> Option<&str> {
        match self {
            Chunk::Thought { content } | Chunk::Text { content } => content.as_deref(),
            Chunk::PhaseComplete => None,
        }
    }
}
