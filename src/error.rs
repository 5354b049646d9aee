use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Error taxonomy for the generation pipeline.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Malformed or out-of-range request fields. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// Missing or unusable configuration, e.g. no API key.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configured model or API version does not exist upstream (HTTP 404).
    #[error("{0}")]
    ModelNotFound(String),

    /// Upstream rejected the credentials (HTTP 401/403).
    #[error("{0}")]
    Auth(String),

    /// Local deadline exceeded or the request was aborted.
    #[error("{0}")]
    Timeout(String),

    /// Network-layer failure before a response was received.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx status or a response body that does not have the expected shape.
    #[error("{0}")]
    Upstream(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptError {
    /// Timeout and network failures qualify for the alternate-auth retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScriptError::Timeout(_) | ScriptError::Transport(_))
    }

    /// Configuration-class failures: missing settings or an unknown model.
    pub fn is_config(&self) -> bool {
        matches!(self, ScriptError::Config(_) | ScriptError::ModelNotFound(_))
    }

    /// HTTP status used when the error is reported by the API layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ScriptError::Validation(_) => 400,
            ScriptError::Auth(_) => 401,
            ScriptError::ModelNotFound(_) => 404,
            ScriptError::Timeout(_) | ScriptError::Transport(_) => 504,
            ScriptError::Upstream(_) => 400,
            ScriptError::Config(_)
            | ScriptError::Json(_)
            | ScriptError::Io(_)
            | ScriptError::Internal(_)
            | ScriptError::Other(_) => 500,
        }
    }
}

/// Cuts `text` to at most `max` characters for inclusion in diagnostics.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
