use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sonozen_config::{Config, LlmConfig, ServerConfig};
use sonozen_core::AnalysisError;
use sonozen_llm::{LLMProvider, OpenAiProvider, ProviderConfig};
use tokio::sync::RwLock;

use crate::analyzer::SleepAnalyzer;

/// 应用状态 - 在 main.rs 中创建并共享给所有 handler
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SleepAnalyzer>,
    pub server: ServerConfig,
}

impl AppState {
    pub fn new(analyzer: SleepAnalyzer, server: ServerConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            server,
        }
    }
}

/// 一次分析调用所用的模型
#[derive(Clone)]
pub struct AnalysisModel {
    pub provider: Arc<dyn LLMProvider>,
    pub temperature: f64,
}

/// 模型来源：每次请求时解析，缺少密钥时返回配置错误
#[async_trait]
pub trait ProviderSource: Send + Sync {
    async fn resolve(&self) -> Result<AnalysisModel, AnalysisError>;
}

/// 命令行覆盖项，优先于配置文件
#[derive(Debug, Clone, Default)]
pub struct LlmOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl LlmOverrides {
    pub fn apply(&self, mut llm: LlmConfig) -> LlmConfig {
        if let Some(base_url) = &self.base_url {
            llm.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            llm.model = model.clone();
        }
        if let Some(api_key) = &self.api_key {
            llm.api_key = Some(api_key.clone());
        }
        llm
    }
}

/// 从（可热重载的）配置构建 OpenAI provider，复用同一个 HTTP 连接池
pub struct ConfiguredProviderSource {
    config: Arc<RwLock<Config>>,
    overrides: LlmOverrides,
    http: reqwest::Client,
}

impl ConfiguredProviderSource {
    pub fn new(config: Arc<RwLock<Config>>, overrides: LlmOverrides) -> Self {
        Self {
            config,
            overrides,
            http: reqwest::Client::new(),
        }
    }

    async fn llm_config(&self) -> LlmConfig {
        let config = self.config.read().await;
        self.overrides.apply(config.llm.clone())
    }
}

#[async_trait]
impl ProviderSource for ConfiguredProviderSource {
    async fn resolve(&self) -> Result<AnalysisModel, AnalysisError> {
        let llm = self.llm_config().await;
        let api_key = llm
            .resolve_api_key()
            .ok_or_else(|| AnalysisError::missing_credential(&llm.api_key_env))?;

        let provider_config = ProviderConfig::new("openai", llm.base_url.as_str())
            .with_api_key(api_key)
            .with_model(llm.model.as_str())
            .with_timeout(llm.timeout_seconds.map(Duration::from_secs));

        Ok(AnalysisModel {
            provider: Arc::new(OpenAiProvider::with_client(provider_config, self.http.clone())),
            temperature: llm.temperature,
        })
    }
}

/// 固定 provider，嵌入或测试时使用；`None` 表示未配置密钥
pub struct StaticProviderSource {
    model: Option<AnalysisModel>,
    credential_env: String,
}

impl StaticProviderSource {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f64) -> Self {
        Self {
            model: Some(AnalysisModel {
                provider,
                temperature,
            }),
            credential_env: String::new(),
        }
    }

    pub fn unconfigured(credential_env: impl Into<String>) -> Self {
        Self {
            model: None,
            credential_env: credential_env.into(),
        }
    }
}

#[async_trait]
impl ProviderSource for StaticProviderSource {
    async fn resolve(&self) -> Result<AnalysisModel, AnalysisError> {
        self.model
            .clone()
            .ok_or_else(|| AnalysisError::missing_credential(&self.credential_env))
    }
}
