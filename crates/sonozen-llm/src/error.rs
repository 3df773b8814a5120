use thiserror::Error;

/// Unified error type for LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("network error: {0}")]
    Network(String),

    #[error("api error: {status} - {}", .message.as_deref().unwrap_or("no error message"))]
    Api {
        status: u16,
        /// `error.message` from the provider's JSON error body, if any
        message: Option<String>,
    },

    #[error("transform error: {0}")]
    Transform(#[from] ConversionError),

    #[error("config error: {0}")]
    Config(String),
}

impl LLMError {
    /// The provider's own error message, when it sent one.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            LLMError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Error during schema transformation
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field: {0}")]
    MissingField(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;
