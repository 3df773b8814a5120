use async_trait::async_trait;

use crate::chat::{ChatRequest, ChatResponse};
use crate::error::Result;

/// LLM Provider trait
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider ID
    fn provider_id(&self) -> &str;

    /// Send a chat request and get a complete response
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}
