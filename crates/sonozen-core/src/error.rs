use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process analysis";

/// Shown when the model API fails without an error message.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Failed to call the OpenAI API";

pub const EMPTY_MESSAGE: &str = "Message cannot be empty";

/// Failures of the analysis endpoint.
///
/// Every variant is reported through the `{ success: false, error }` envelope; the
/// display string is the `error` text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Empty or malformed input. Reported as a client error.
    #[error("{0}")]
    Validation(String),

    /// The model credential is missing. Not retryable by the end user.
    #[error("{0}")]
    Configuration(String),

    /// The model API failed or replied with something unusable.
    #[error("{0}")]
    Upstream(String),
}

impl AnalysisError {
    pub fn empty_message() -> Self {
        Self::Validation(EMPTY_MESSAGE.to_string())
    }

    /// Missing credential, with the variable the operator needs to set.
    pub fn missing_credential(env_var: &str) -> Self {
        Self::Configuration(format!(
            "To use AI sleep analysis you need to configure your OpenAI API key. \
             Set the {} environment variable (or llm.api_key in the server config) and try again.",
            env_var
        ))
    }

    /// Upstream failure, keeping the provider's own message when it sent one.
    pub fn upstream(message: Option<String>) -> Self {
        match message.filter(|m| !m.trim().is_empty()) {
            Some(message) => Self::Upstream(message),
            None => Self::Upstream(UPSTREAM_FALLBACK_MESSAGE.to_string()),
        }
    }

    /// HTTP status code the endpoint answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Configuration(_) | Self::Upstream(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Configuration(_) => "configuration",
            Self::Upstream(_) => "upstream",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
