//! SpecDrafter client error types

/// SpecDrafter client error types
#[derive(Debug, thiserror::Error)]
pub enum DrafterError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Streaming errors
    #[error("stream error: {0}")]
    Stream(String),

    /// A chat turn is already streaming for this conversation.
    #[error("a response is already streaming for this conversation")]
    StreamActive,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),
}

impl DrafterError {
    /// Whether resubmitting the same request may succeed.
    ///
    /// Nothing retries automatically; callers use this to decide whether to
    /// offer a resubmit.
    pub fn is_transient(&self) -> bool {
        match self {
            DrafterError::Http(_) | DrafterError::Stream(_) => true,
            DrafterError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for SpecDrafter operations
pub type Result<T> = std::result::Result<T, DrafterError>;
