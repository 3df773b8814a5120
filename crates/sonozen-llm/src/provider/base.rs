use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Client};
use std::sync::Arc;

use crate::auth::{ApiKeyAuth, Authenticator, NoAuth};
use crate::chat::{ChatRequest, ChatResponse};
use crate::error::{LLMError, Result};
use crate::provider::{AuthConfig, LLMProvider, ProviderConfig};
use crate::transformer::SchemaTransformer;

/// Base provider implementation
/// Handles common HTTP functionality and delegates schema transformation
pub struct BaseProvider<T: SchemaTransformer> {
    config: ProviderConfig,
    http_client: Client,
    transformer: Arc<T>,
    authenticator: Arc<dyn Authenticator>,
}

impl<T: SchemaTransformer + 'static> BaseProvider<T> {
    /// Create a new base provider with its own HTTP client
    pub fn new(config: ProviderConfig, transformer: T) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| LLMError::Config(e.to_string()))?;

        Ok(Self::with_client(config, transformer, http_client))
    }

    /// Create on top of a shared HTTP client.
    /// A configured timeout is applied per request.
    pub fn with_client(config: ProviderConfig, transformer: T, http_client: Client) -> Self {
        let authenticator: Arc<dyn Authenticator> = match &config.auth {
            AuthConfig::ApiKey { key } => Arc::new(ApiKeyAuth::new(key.clone())),
            AuthConfig::None => Arc::new(NoAuth),
        };

        Self {
            config,
            http_client,
            transformer: Arc::new(transformer),
            authenticator,
        }
    }

    pub fn provider_id(&self) -> &str {
        self.transformer.provider_id()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Build request headers
    async fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some((header_name, header_value)) = self.authenticator.get_auth_header().await? {
            let name = header::HeaderName::from_bytes(header_name.as_bytes())
                .map_err(|e| LLMError::Config(format!("Invalid auth header name: {}", e)))?;
            let value = header::HeaderValue::from_str(&header_value)
                .map_err(|e| LLMError::Config(format!("Invalid auth header value: {}", e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Send a non-streaming request
    pub async fn send_request(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut request = request;
        if request.model.is_empty() {
            request.model = self.config.model.clone();
        }

        let body = self.transformer.transform_request(&request)?;
        let headers = self.build_headers().await?;
        let url = self.config.completions_url();

        debug!("POST {} (model={})", url, request.model);

        let mut builder = self.http_client.post(&url).headers(headers).json(&body);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Provider returned {}: {}", status, error_text);
            return Err(LLMError::Api {
                status: status.as_u16(),
                message: extract_error_message(&error_text),
            });
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        self.transformer
            .parse_response(&response_data)
            .map_err(LLMError::Transform)
    }
}

/// Pull `error.message` out of an OpenAI-style error body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[async_trait]
impl<T: SchemaTransformer + 'static> LLMProvider for BaseProvider<T> {
    fn provider_id(&self) -> &str {
        self.provider_id()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.send_request(request).await
    }
}
