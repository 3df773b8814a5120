use serde_json::{json, Value};

use crate::chat::{ChatRequest, ChatResponse, ChatUsage, Message, ResponseFormat};
use crate::error::ConversionError;
use crate::transformer::SchemaTransformer;

/// OpenAI chat-completions schema
#[derive(Debug, Clone, Default)]
pub struct OpenAiTransformer;

impl OpenAiTransformer {
    pub fn new() -> Self {
        Self
    }

    fn convert_message(&self, msg: &Message) -> Value {
        json!({
            "role": msg.role.to_string(),
            "content": msg.content,
        })
    }
}

impl SchemaTransformer for OpenAiTransformer {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn transform_request(&self, request: &ChatRequest) -> Result<Value, ConversionError> {
        if request.messages.is_empty() {
            return Err(ConversionError::MissingField("messages".to_string()));
        }

        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| self.convert_message(m))
            .collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
        });

        if let Some(temp) = request.options.temperature {
            body["temperature"] = json!(temp);
        }

        if let Some(ResponseFormat::JsonObject) = request.options.response_format {
            body["response_format"] = json!({ "type": "json_object" });
        }

        Ok(body)
    }

    fn parse_response(&self, data: &Value) -> Result<ChatResponse, ConversionError> {
        let id = data["id"].as_str().unwrap_or_default().to_string();
        let model = data["model"].as_str().unwrap_or_default().to_string();

        let choice = data["choices"]
            .get(0)
            .ok_or_else(|| ConversionError::MissingField("choices".to_string()))?;

        let content = choice["message"]["content"].as_str().map(String::from);
        let finish_reason = choice["finish_reason"].as_str().map(String::from);

        let usage_data = data.get("usage");
        let usage = ChatUsage {
            input_tokens: usage_data
                .and_then(|u| u["prompt_tokens"].as_u64())
                .unwrap_or(0) as u32,
            output_tokens: usage_data
                .and_then(|u| u["completion_tokens"].as_u64())
                .unwrap_or(0) as u32,
            total_tokens: usage_data
                .and_then(|u| u["total_tokens"].as_u64())
                .unwrap_or(0) as u32,
        };

        Ok(ChatResponse {
            id,
            model,
            content,
            finish_reason,
            usage,
        })
    }
}
