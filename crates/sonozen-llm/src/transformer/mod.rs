pub mod openai;

pub use openai::OpenAiTransformer;

use serde_json::Value;

use crate::chat::{ChatRequest, ChatResponse};
use crate::error::ConversionError;

/// Schema transformer trait for converting between internal and provider formats
pub trait SchemaTransformer: Send + Sync {
    /// Get the provider ID
    fn provider_id(&self) -> &str;

    /// Transform request to provider-specific format
    fn transform_request(&self, request: &ChatRequest) -> Result<Value, ConversionError>;

    /// Parse a complete response (non-streaming)
    fn parse_response(&self, data: &Value) -> Result<ChatResponse, ConversionError>;
}
