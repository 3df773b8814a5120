use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Authentication configuration
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// API Key authentication (OpenAI style)
    ApiKey { key: String },
    #[default]
    None,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::ApiKey { .. } => write!(f, "ApiKey {{ key: *** }}"),
            AuthConfig::None => write!(f, "None"),
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_id: String,
    /// Base URL for the API, without the trailing `/chat/completions`
    pub base_url: String,
    pub auth: AuthConfig,
    /// Model used when a request leaves `model` empty
    pub model: String,
    /// `None` waits for the provider indefinitely
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    pub fn new(provider_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            provider_id: provider_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: AuthConfig::None,
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = AuthConfig::ApiKey { key: key.into() };
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new("openai", DEFAULT_BASE_URL)
    }
}
