use serde::{Deserialize, Serialize};

const SECRET_MASK: &str = "********";

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            identity: IdentityConfig::default(),
            client: ClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// 用于展示的副本，密钥替换为掩码
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.llm.api_key.is_some() {
            config.llm.api_key = Some(SECRET_MASK.to_string());
        }
        config
    }

    /// 获取配置值的快捷方法
    pub fn get_value(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["version"] => Some(self.version.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "cors"] => Some(self.server.cors.to_string()),
            ["llm", "base_url"] => Some(self.llm.base_url.clone()),
            ["llm", "model"] => Some(self.llm.model.clone()),
            ["llm", "temperature"] => Some(self.llm.temperature.to_string()),
            ["llm", "api_key_env"] => Some(self.llm.api_key_env.clone()),
            // 不回显密钥本身
            ["llm", "api_key"] => self.llm.api_key.as_ref().map(|_| SECRET_MASK.to_string()),
            ["llm", "timeout_seconds"] => self.llm.timeout_seconds.map(|t| t.to_string()),
            ["identity", "url"] => self.identity.url.clone(),
            ["identity", "anon_key"] => self.identity.anon_key.clone(),
            ["identity", "url_env"] => Some(self.identity.url_env.clone()),
            ["identity", "anon_key_env"] => Some(self.identity.anon_key_env.clone()),
            ["client", "server_url"] => Some(self.client.server_url.clone()),
            ["client", "storage_dir"] => self.client.storage_dir.clone(),
            ["logging", "level"] => Some(self.logging.level.to_string()),
            ["logging", "json"] => Some(self.logging.json.to_string()),
            _ => None,
        }
    }

    /// 设置配置值
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid port number: {}", value))
                })?;
            }
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "cors"] => {
                self.server.cors = parse_bool(value)?;
            }
            ["llm", "base_url"] => {
                self.llm.base_url = value.trim_end_matches('/').to_string();
            }
            ["llm", "model"] => {
                self.llm.model = value.to_string();
            }
            ["llm", "temperature"] => {
                self.llm.temperature = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid temperature: {}", value))
                })?;
            }
            ["llm", "api_key"] => {
                self.llm.api_key = non_empty(value);
            }
            ["llm", "api_key_env"] => {
                self.llm.api_key_env = value.to_string();
            }
            ["llm", "timeout_seconds"] => {
                self.llm.timeout_seconds = match non_empty(value) {
                    Some(v) => Some(v.parse().map_err(|_| {
                        ConfigError::Validation(format!("Invalid number: {}", value))
                    })?),
                    None => None,
                };
            }
            ["identity", "url"] => {
                self.identity.url = non_empty(value);
            }
            ["identity", "anon_key"] => {
                self.identity.anon_key = non_empty(value);
            }
            ["identity", "url_env"] => {
                self.identity.url_env = value.to_string();
            }
            ["identity", "anon_key_env"] => {
                self.identity.anon_key_env = value.to_string();
            }
            ["client", "server_url"] => {
                self.client.server_url = value.trim_end_matches('/').to_string();
            }
            ["client", "storage_dir"] => {
                self.client.storage_dir = non_empty(value);
            }
            ["logging", "level"] => {
                self.logging.level = value.parse()?;
            }
            ["logging", "json"] => {
                self.logging.json = parse_bool(value)?;
            }
            _ => return Err(ConfigError::KeyNotFound(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> ConfigResult<bool> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("Invalid boolean: {}", value)))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// 读取非空环境变量
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| non_empty(&v))
}

/// Server 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            cors: true,
        }
    }
}

/// LLM 配置（外部模型）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// 直接配置的密钥，优先于环境变量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// 不设置则不限制超时
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: default_temperature(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_seconds: None,
        }
    }
}

impl LlmConfig {
    /// 解析模型密钥：先取配置值，再取环境变量
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .and_then(non_empty)
            .or_else(|| env_non_empty(&self.api_key_env))
    }
}

/// 身份服务配置（外部会话协作方）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    #[serde(default = "default_identity_url_env")]
    pub url_env: String,
    #[serde(default = "default_identity_key_env")]
    pub anon_key_env: String,
}

fn default_identity_url_env() -> String {
    "SONOZEN_IDENTITY_URL".to_string()
}

fn default_identity_key_env() -> String {
    "SONOZEN_IDENTITY_ANON_KEY".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            url_env: default_identity_url_env(),
            anon_key_env: default_identity_key_env(),
        }
    }
}

/// 已解析的身份服务端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEndpoint {
    pub url: String,
    pub anon_key: String,
}

impl IdentityConfig {
    /// URL 与公钥都存在时才算已配置
    pub fn resolve(&self) -> Option<IdentityEndpoint> {
        let url = self
            .url
            .as_deref()
            .and_then(non_empty)
            .or_else(|| env_non_empty(&self.url_env))?;
        let anon_key = self
            .anon_key
            .as_deref()
            .and_then(non_empty)
            .or_else(|| env_non_empty(&self.anon_key_env))?;
        Some(IdentityEndpoint {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    /// 本地存储目录，默认 ~/.sonozen/storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            storage_dir: None,
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Watch error: {0}")]
    #[cfg(feature = "hot-reload")]
    Watch(#[from] notify::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert!(config.llm.timeout_seconds.is_none());
    }

    #[test]
    fn test_get_and_set_value() {
        let mut config = Config::default();
        config.set_value("server.port", "8088").unwrap();
        config.set_value("llm.model", "gpt-4o-mini").unwrap();
        config.set_value("logging.level", "debug").unwrap();

        assert_eq!(config.get_value("server.port").as_deref(), Some("8088"));
        assert_eq!(config.get_value("llm.model").as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.get_value("logging.level").as_deref(), Some("debug"));
        assert!(config.set_value("server.port", "nope").is_err());
        assert!(matches!(
            config.set_value("no.such.key", "x"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_api_key_is_masked() {
        let mut config = Config::default();
        assert!(config.get_value("llm.api_key").is_none());
        config.set_value("llm.api_key", "sk-secret").unwrap();
        assert_eq!(config.get_value("llm.api_key").as_deref(), Some("********"));
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let mut config = Config::default();
        config.set_value("llm.api_key", "sk-secret").unwrap();

        let shown = serde_json::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("********"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-secret"));

        assert_eq!(Config::default().redacted().llm.api_key, None);
    }

    #[test]
    fn test_resolve_api_key_prefers_config_value() {
        let llm = LlmConfig {
            api_key: Some("sk-config".to_string()),
            api_key_env: "SONOZEN_TEST_KEY_PREFERS".to_string(),
            ..LlmConfig::default()
        };
        std::env::set_var("SONOZEN_TEST_KEY_PREFERS", "sk-env");
        assert_eq!(llm.resolve_api_key().as_deref(), Some("sk-config"));
        std::env::remove_var("SONOZEN_TEST_KEY_PREFERS");
    }

    #[test]
    fn test_resolve_api_key_from_env() {
        let llm = LlmConfig {
            api_key_env: "SONOZEN_TEST_KEY_FROM_ENV".to_string(),
            ..LlmConfig::default()
        };
        std::env::remove_var("SONOZEN_TEST_KEY_FROM_ENV");
        assert!(llm.resolve_api_key().is_none());

        std::env::set_var("SONOZEN_TEST_KEY_FROM_ENV", "  ");
        assert!(llm.resolve_api_key().is_none());

        std::env::set_var("SONOZEN_TEST_KEY_FROM_ENV", "sk-env");
        assert_eq!(llm.resolve_api_key().as_deref(), Some("sk-env"));
        std::env::remove_var("SONOZEN_TEST_KEY_FROM_ENV");
    }

    #[test]
    fn test_identity_requires_both_values() {
        let identity = IdentityConfig {
            url: Some("https://id.example.com/".to_string()),
            anon_key: None,
            url_env: "SONOZEN_TEST_ID_URL_UNSET".to_string(),
            anon_key_env: "SONOZEN_TEST_ID_KEY_UNSET".to_string(),
        };
        assert!(identity.resolve().is_none());

        let identity = IdentityConfig {
            anon_key: Some("public-key".to_string()),
            ..identity
        };
        let endpoint = identity.resolve().unwrap();
        assert_eq!(endpoint.url, "https://id.example.com");
        assert_eq!(endpoint.anon_key, "public-key");
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let config: Config = serde_json::from_str(r#"{"version":"0.1.0"}"#).unwrap();
        assert_eq!(config.llm, LlmConfig::default());
        assert_eq!(config.client.server_url, "http://127.0.0.1:3000");
    }
}
