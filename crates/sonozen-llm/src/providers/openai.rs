use async_trait::async_trait;
use reqwest::Client;

use crate::chat::{ChatRequest, ChatResponse};
use crate::error::Result;
use crate::provider::{BaseProvider, LLMProvider, ProviderConfig};
use crate::transformer::OpenAiTransformer;

/// OpenAI Provider
/// Uses the OpenAI API or any compatible chat-completions endpoint
pub struct OpenAiProvider {
    base: BaseProvider<OpenAiTransformer>,
}

impl OpenAiProvider {
    /// Create with custom configuration
    pub fn with_config(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            base: BaseProvider::new(config, OpenAiTransformer::new())?,
        })
    }

    /// Create on a shared HTTP client (connection pool reuse across requests)
    pub fn with_client(config: ProviderConfig, client: Client) -> Self {
        Self {
            base: BaseProvider::with_client(config, OpenAiTransformer::new(), client),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        self.base.config()
    }
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        self.base.provider_id()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.base.send_request(request).await
    }
}
