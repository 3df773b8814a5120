use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::record::SleepAnalysisRecord;

/// Body of `POST /api/analyze-sleep`.
///
/// `message` is optional at the wire level so a missing or null field is reported
/// as a validation failure instead of a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The message with surrounding whitespace removed, rejecting empty input.
    pub fn trimmed_message(&self) -> Result<&str, AnalysisError> {
        validate_message(self.message.as_deref().unwrap_or_default())
    }
}

/// Trim `message` and reject it if nothing is left.
pub fn validate_message(message: &str) -> Result<&str, AnalysisError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::empty_message());
    }
    Ok(trimmed)
}

/// Uniform response envelope: `{ success, analysis? , error? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<SleepAnalysisRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeResponse {
    pub fn ok(record: SleepAnalysisRecord) -> Self {
        Self {
            success: true,
            analysis: Some(record),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            analysis: None,
            error: Some(error.into()),
        }
    }

    /// Collapse the envelope into a result. A success envelope without a record
    /// counts as a failure.
    pub fn into_result(self) -> Result<SleepAnalysisRecord, String> {
        match (self.success, self.analysis) {
            (true, Some(record)) => Ok(record),
            _ => Err(self
                .error
                .unwrap_or_else(|| crate::error::GENERIC_FAILURE_MESSAGE.to_string())),
        }
    }
}

impl From<&AnalysisError> for AnalyzeResponse {
    fn from(err: &AnalysisError) -> Self {
        Self::failure(err.to_string())
    }
}
