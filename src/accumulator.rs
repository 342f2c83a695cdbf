//! Folding chat chunks into the in-progress assistant message.

use crate::directive;
use crate::types::{Chunk, Message};

/// Out-of-band notification raised while applying a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The backend advanced the project to its next phase.
    PhaseAdvanced,
}

/// Result of a fully consumed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The assembled assistant message, text left exactly as streamed
    pub message: Message,
    /// Name carried by a `[RENAME_PROJECT: "..."]` directive, if present
    pub rename: Option<String>,
    /// Number of phase-complete chunks seen
    pub phase_advances: usize,
}

/// Owns the in-progress assistant message while a response streams.
#[derive(Debug, Clone)]
pub struct MessageAccumulator {
    message: Message,
    phase_advances: usize,
}

impl Default for MessageAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self {
            message: Message::assistant(""),
            phase_advances: 0,
        }
    }

    /// Apply one chunk in arrival order.
    pub fn apply(&mut self, chunk: &Chunk) -> Option<Signal> {
        match chunk {
            Chunk::Thought { content } => {
                if let Some(text) = content {
                    self.message.push_reasoning(text);
                }
                None
            }
            Chunk::Text { content } => {
                if let Some(text) = content {
                    self.message.push_content(text);
                }
                None
            }
            Chunk::PhaseComplete => {
                self.phase_advances += 1;
                Some(Signal::PhaseAdvanced)
            }
        }
    }

    /// The message as assembled so far.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Finish the stream: extract directives and hand the message over.
    pub fn finish(self) -> Completion {
        let rename = directive::extract_rename(&self.message.content);
        Completion {
            message: self.message,
            rename,
            phase_advances: self.phase_advances,
        }
    }

    /// Abandon the stream, keeping whatever text arrived.
    pub fn into_partial(self) -> Message {
        self.message
    }
}
