use crate::config::{Config, ConfigError, ConfigResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 配置管理器
#[derive(Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Arc<RwLock<Config>>,
    #[cfg(feature = "hot-reload")]
    watcher: Option<Arc<std::sync::Mutex<notify::RecommendedWatcher>>>,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ConfigManager {
    /// 加载配置文件，不存在时写入默认配置
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let config = if path.exists() {
            info!("Loading config from {:?}", path);
            Self::read_file(path).await?
        } else {
            info!("Config file not found, creating default config at {:?}", path);
            let default_config = Config::default();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let content = serde_json::to_string_pretty(&default_config)?;
            tokio::fs::write(path, &content).await?;
            default_config
        };

        Self::validate(&config)?;

        Ok(Self::new(config, path.to_path_buf()))
    }

    /// 从默认位置加载配置
    pub async fn load_default() -> ConfigResult<Self> {
        let config_path = Self::default_config_path()?;
        Self::load(&config_path).await
    }

    /// 获取默认配置路径 (~/.sonozen/config.json)
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        crate::default_config_path()
            .ok_or_else(|| ConfigError::InvalidPath("Could not find home directory".to_string()))
    }

    /// 用给定配置创建管理器（不读文件，测试和 CLI 覆盖时使用）
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(config)),
            #[cfg(feature = "hot-reload")]
            watcher: None,
        }
    }

    /// 获取配置的共享引用
    pub fn get(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    /// 当前配置的快照
    pub async fn snapshot(&self) -> Config {
        self.config.read().await.clone()
    }

    /// 保存配置到文件
    pub async fn save(&self) -> ConfigResult<()> {
        self.save_to(&self.path).await?;
        info!("Config saved to {:?}", self.path);
        Ok(())
    }

    /// 保存配置到指定路径
    pub async fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config = self.config.read().await;
        let content = serde_json::to_string_pretty(&*config)?;
        drop(config);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// 重新加载配置
    pub async fn reload(&self) -> ConfigResult<()> {
        Self::reload_into(&self.path, &self.config).await?;
        info!("Config reloaded from {:?}", self.path);
        Ok(())
    }

    async fn reload_into(path: &Path, target: &RwLock<Config>) -> ConfigResult<()> {
        if !path.exists() {
            return Err(ConfigError::InvalidPath(format!(
                "Config file not found: {:?}",
                path
            )));
        }

        let new_config = Self::read_file(path).await?;
        Self::validate(&new_config)?;

        let mut config = target.write().await;
        *config = new_config;
        Ok(())
    }

    async fn read_file(path: &Path) -> ConfigResult<Config> {
        let content = tokio::fs::read_to_string(path).await?;
        let content = Self::expand_env_vars(&content)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 更新配置并保存
    pub async fn update<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config) -> ConfigResult<()>,
    {
        let mut config = self.config.write().await;
        let mut candidate = config.clone();
        f(&mut candidate)?;
        Self::validate(&candidate)?;
        *config = candidate;
        drop(config);
        self.save().await
    }

    /// 验证配置
    pub fn validate(config: &Config) -> ConfigResult<()> {
        if config.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }

        if config.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "LLM model cannot be empty".to_string(),
            ));
        }

        if config.llm.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "LLM base_url cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "LLM temperature must be between 0 and 2, got {}",
                config.llm.temperature
            )));
        }

        if config.llm.timeout_seconds == Some(0) {
            return Err(ConfigError::Validation(
                "LLM timeout_seconds must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// 展开环境变量 ${VAR} 或 ${VAR:-default}
    fn expand_env_vars(content: &str) -> ConfigResult<String> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = match PATTERN.get() {
            Some(re) => re,
            None => {
                let compiled = Regex::new(r"\$\{([^}]+)\}")
                    .map_err(|e| ConfigError::Validation(e.to_string()))?;
                PATTERN.get_or_init(|| compiled)
            }
        };

        let mut result = String::with_capacity(content.len());
        let mut last = 0;

        for cap in re.captures_iter(content) {
            let (Some(full_match), Some(var_expr)) = (cap.get(0), cap.get(1)) else {
                continue;
            };

            let var_expr = var_expr.as_str();
            let (var_name, default_value) = match var_expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (var_expr, None),
            };

            let replacement = match std::env::var(var_name) {
                Ok(val) => val,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => return Err(ConfigError::EnvVarNotFound(var_name.to_string())),
                },
            };

            result.push_str(&content[last..full_match.start()]);
            result.push_str(&replacement);
            last = full_match.end();
        }

        result.push_str(&content[last..]);
        Ok(result)
    }

    /// 获取配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(feature = "hot-reload")]
impl ConfigManager {
    /// 启动热重载监听（需在 tokio runtime 中调用）
    pub fn watch<F>(&mut self, callback: F) -> ConfigResult<()>
    where
        F: Fn() + Send + 'static,
    {
        use notify::{
            Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode,
            Result as NotifyResult, Watcher,
        };

        let path = self.path.clone();
        let config = Arc::clone(&self.config);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: NotifyResult<Event>| {
                if let Ok(event) = res {
                    if event.kind.is_modify() {
                        let _ = tx.send(());
                    }
                }
            },
            NotifyConfig::default(),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        self.watcher = Some(Arc::new(std::sync::Mutex::new(watcher)));

        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                debug!("Config file changed, reloading...");

                match Self::reload_into(&path, &config).await {
                    Ok(()) => {
                        info!("Config hot-reloaded successfully");
                        callback();
                    }
                    Err(e) => {
                        warn!("Failed to hot-reload config: {}", e);
                    }
                }
            }
        });

        info!("Started watching config file: {:?}", self.path);
        Ok(())
    }

    /// 停止热重载监听
    pub fn unwatch(&mut self) -> ConfigResult<()> {
        if let Some(watcher) = self.watcher.take() {
            use notify::Watcher;
            if let Ok(mut w) = watcher.lock() {
                w.unwatch(&self.path)?;
            }
            info!("Stopped watching config file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let manager = ConfigManager::load(&config_path).await.unwrap();
        let config = manager.snapshot().await;

        assert!(config_path.exists());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_env_var_expansion() {
        std::env::set_var("SONOZEN_TEST_EXPAND", "test_value");

        let content = r#"{"key": "${SONOZEN_TEST_EXPAND}", "other": "${SONOZEN_TEST_UNSET_X:-fallback}"}"#;
        let expanded = ConfigManager::expand_env_vars(content).unwrap();

        assert_eq!(expanded, r#"{"key": "test_value", "other": "fallback"}"#);
        std::env::remove_var("SONOZEN_TEST_EXPAND");
    }

    #[tokio::test]
    async fn test_env_var_expansion_missing_var() {
        let content = r#"{"key": "${SONOZEN_TEST_DEFINITELY_UNSET}"}"#;
        assert!(matches!(
            ConfigManager::expand_env_vars(content),
            Err(ConfigError::EnvVarNotFound(name)) if name == "SONOZEN_TEST_DEFINITELY_UNSET"
        ));
    }

    #[tokio::test]
    async fn test_config_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(ConfigManager::validate(&config).is_err());

        config.server.port = 8080;
        assert!(ConfigManager::validate(&config).is_ok());

        config.llm.temperature = 3.5;
        assert!(ConfigManager::validate(&config).is_err());
    }

    #[tokio::test]
    async fn test_update_saves_and_reload_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let manager = ConfigManager::load(&config_path).await.unwrap();

        manager
            .update(|config| config.set_value("llm.model", "gpt-4o-mini"))
            .await
            .unwrap();

        let other = ConfigManager::load(&config_path).await.unwrap();
        assert_eq!(other.snapshot().await.llm.model, "gpt-4o-mini");

        tokio::fs::write(
            &config_path,
            serde_json::to_string(&{
                let mut c = Config::default();
                c.server.port = 4321;
                c
            })
            .unwrap(),
        )
        .await
        .unwrap();
        manager.reload().await.unwrap();
        assert_eq!(manager.snapshot().await.server.port, 4321);
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::load(&temp_dir.path().join("config.json"))
            .await
            .unwrap();

        let result = manager
            .update(|config| config.set_value("llm.temperature", "9"))
            .await;
        assert!(result.is_err());
        assert_eq!(manager.snapshot().await.llm.temperature, 0.7);
    }
}
