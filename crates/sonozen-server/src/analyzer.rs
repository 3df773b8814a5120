//! Sleep analysis - one model call per request

use std::sync::Arc;

use sonozen_core::{validate_message, AnalysisError, SleepAnalysis, SleepAnalysisRecord};
use sonozen_llm::{ChatRequest, LLMError, Message};
use tracing::{debug, error, info, warn};

use crate::state::ProviderSource;

/// Reported when the model's reply is not the expected analysis object.
pub const INVALID_ANALYSIS_MESSAGE: &str = "The model returned an invalid analysis";

/// Fixed system instruction: output schema and scoring rubric.
pub const SYSTEM_PROMPT: &str = r#"You are a sleep and sleep-health specialist. Analyze the user's message about their sleep problems and return a JSON object with the following structure:
{
  "mainIssues": ["issue 1", "issue 2", "issue 3"],
  "recommendations": ["recommendation 1", "recommendation 2", "recommendation 3", "recommendation 4", "recommendation 5"],
  "sleepScore": 75,
  "summary": "A detailed summary of the analysis"
}

- mainIssues: the 3-5 main problems identified
- recommendations: 5-7 practical, personalized recommendations
- sleepScore: a score from 0-100 based on the severity of the problems
- summary: a 2-3 sentence summary of the user's sleep situation

Be empathetic, practical and focused on solutions grounded in sleep science."#;

pub struct SleepAnalyzer {
    source: Arc<dyn ProviderSource>,
}

impl SleepAnalyzer {
    pub fn new(source: Arc<dyn ProviderSource>) -> Self {
        Self { source }
    }

    /// Validate, resolve the model, call it once and build a fresh record.
    ///
    /// Validation runs before the credential check, so empty input never reaches
    /// the network.
    pub async fn analyze(&self, message: &str) -> Result<SleepAnalysisRecord, AnalysisError> {
        let message = validate_message(message)?;
        let model = self.source.resolve().await?;

        info!(
            "Analyzing sleep message ({} chars) with provider {}",
            message.chars().count(),
            model.provider.provider_id()
        );

        let request = ChatRequest::new("")
            .with_message(Message::system(SYSTEM_PROMPT))
            .with_message(Message::user(message))
            .temperature(model.temperature)
            .json_object();

        let response = model
            .provider
            .chat(request)
            .await
            .map_err(upstream_error)?;

        let analysis = parse_analysis(response.content.as_deref())?;
        let record = SleepAnalysisRecord::new(message, analysis);

        debug!("Analysis {} scored {}", record.id, record.sleep_score());
        Ok(record)
    }
}

/// Parse the assistant message as a `SleepAnalysis`. Values are taken as the model
/// gives them; only the shape is checked.
pub fn parse_analysis(content: Option<&str>) -> Result<SleepAnalysis, AnalysisError> {
    let content = content.map(str::trim).filter(|c| !c.is_empty()).ok_or_else(|| {
        warn!("Model reply had no content");
        AnalysisError::Upstream(INVALID_ANALYSIS_MESSAGE.to_string())
    })?;

    serde_json::from_str(content).map_err(|e| {
        warn!("Model reply is not a valid analysis: {}", e);
        AnalysisError::Upstream(INVALID_ANALYSIS_MESSAGE.to_string())
    })
}

fn upstream_error(err: LLMError) -> AnalysisError {
    match err {
        LLMError::Api { status, message } => {
            warn!("Model API returned status {}", status);
            AnalysisError::upstream(message)
        }
        LLMError::Network(e) => {
            warn!("Model API unreachable: {}", e);
            AnalysisError::upstream(None)
        }
        LLMError::Transform(e) => {
            warn!("Model API reply could not be read: {}", e);
            AnalysisError::Upstream(INVALID_ANALYSIS_MESSAGE.to_string())
        }
        LLMError::Config(e) => {
            error!("Model provider misconfigured: {}", e);
            AnalysisError::Configuration(format!("Invalid model provider configuration: {}", e))
        }
    }
}
