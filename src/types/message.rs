//! Message types for project conversations

use serde::{Deserialize, Serialize};

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Side data attached to a message.
///
/// Travels as the `data` object on the wire. Assistant messages carry the
/// model's reasoning ("thoughts"); audio user messages carry the recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auxiliary {
    #[serde(rename = "thoughts", default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Base64-encoded audio recording
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Auxiliary>,
    /// Set by the backend on stored history entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            auxiliary: None,
            timestamp: None,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            auxiliary: None,
            timestamp: None,
        }
    }

    /// Create a user message carrying a base64 audio recording.
    ///
    /// The text may be empty. An empty text is left out of chat requests,
    /// and the backend then records the turn with an `[audio input]`
    /// placeholder.
    pub fn user_audio(
        content: impl Into<String>,
        audio_base64: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            auxiliary: Some(Auxiliary {
                reasoning: None,
                audio: Some(audio_base64.into()),
                mime_type: Some(mime_type.into()),
            }),
            ..Self::user(content)
        }
    }

    /// Accumulated reasoning text, if any was streamed
    pub fn reasoning(&self) -> Option<&str> {
        self.auxiliary.as_ref()?.reasoning.as_deref()
    }

    /// Append to the reasoning buffer, creating it empty first if absent.
    pub fn push_reasoning(&mut self, text: &str) {
        self.auxiliary
            .get_or_insert_with(Auxiliary::default)
            .reasoning
            .get_or_insert_with(String::new)
            .push_str(text);
    }

    /// Append to the visible content.
    pub fn push_content(&mut self, text: &str) {
        self.content.push_str(text);
    }
}
