pub mod config;
pub mod manager;

pub use config::{
    ClientConfig, Config, ConfigError, ConfigResult, IdentityConfig, IdentityEndpoint, LlmConfig,
    LogLevel, LoggingConfig, ServerConfig,
};
pub use manager::ConfigManager;

use std::path::PathBuf;

/// 获取 SonoZen 配置目录路径
pub fn sonozen_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sonozen"))
}

/// 获取默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    sonozen_dir().map(|dir| dir.join("config.json"))
}

/// 获取默认客户端本地存储目录
pub fn default_storage_dir() -> Option<PathBuf> {
    sonozen_dir().map(|dir| dir.join("storage"))
}

/// 客户端存储目录：配置值优先，否则默认目录
pub fn storage_dir(config: &ClientConfig) -> Option<PathBuf> {
    match config.storage_dir.as_deref() {
        Some(dir) => expand_tilde(dir),
        None => default_storage_dir(),
    }
}

/// 初始化 SonoZen 目录结构
pub async fn init_sonozen_dirs() -> ConfigResult<()> {
    if let Some(root) = sonozen_dir() {
        tokio::fs::create_dir_all(&root).await?;
        tokio::fs::create_dir_all(root.join("storage")).await?;
    }
    Ok(())
}

/// 展开路径中的 ~ 为用户主目录
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}
