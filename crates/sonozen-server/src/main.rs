use std::sync::Arc;

use clap::Parser;
use sonozen_config::ConfigManager;
use sonozen_server::logging::init_logging;
use sonozen_server::{run_server, AppState, ConfiguredProviderSource, LlmOverrides, SleepAnalyzer};

#[derive(Parser, Debug, Clone)]
#[command(name = "sonozen-server")]
#[command(about = "SonoZen sleep analysis HTTP server")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Listen address (overrides config)
    #[arg(long, env = "SONOZEN_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long, env = "SONOZEN_PORT")]
    port: Option<u16>,

    /// LLM API base URL (overrides config)
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,

    /// LLM model name (overrides config)
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// LLM API key (overrides config and the configured environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Config file path
    #[arg(long, env = "SONOZEN_CONFIG", default_value = "~/.sonozen/config.json")]
    config: String,

    /// Disable hot-reload
    #[arg(long, default_value = "false")]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 展开配置文件路径
    let config_path = sonozen_config::expand_tilde(&cli.config)
        .unwrap_or_else(|| std::path::PathBuf::from(&cli.config));

    // 初始化 SonoZen 目录结构
    if let Err(e) = sonozen_config::init_sonozen_dirs().await {
        eprintln!("Warning: Failed to init sonozen directories: {}", e);
    }

    // 加载配置
    #[cfg_attr(not(feature = "hot-reload"), allow(unused_mut))]
    let mut config_manager = ConfigManager::load(&config_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load config from {:?}: {}", config_path, e))?;

    let config = config_manager.snapshot().await;

    // 初始化日志
    let log_level = cli.log_level.clone().unwrap_or_else(|| {
        if cli.debug {
            "debug".to_string()
        } else {
            config.logging.level.to_string()
        }
    });
    init_logging(&log_level, config.logging.json)?;

    // 启动热重载（如果未禁用）
    #[cfg(feature = "hot-reload")]
    if !cli.no_watch {
        if let Err(e) = config_manager.watch(|| {
            tracing::info!("Config hot-reloaded");
        }) {
            tracing::warn!("Failed to start config watcher: {}", e);
        }
    }

    // 确定最终配置值（CLI 参数覆盖配置文件）
    let mut server = config.server.clone();
    if let Some(host) = cli.host {
        server.host = host;
    }
    if let Some(port) = cli.port {
        server.port = port;
    }

    let overrides = LlmOverrides {
        base_url: cli.llm_base_url,
        model: cli.model,
        api_key: cli.api_key,
    };
    let llm = overrides.apply(config.llm.clone());

    tracing::info!("Starting SonoZen Server on {}:{}", server.host, server.port);
    tracing::info!("LLM Configuration:");
    tracing::info!("  Base URL: {}", llm.base_url);
    tracing::info!("  Model: {}", llm.model);
    if llm.resolve_api_key().is_none() {
        tracing::warn!(
            "No model API key found in config or ${}; analysis requests will fail until one is set",
            llm.api_key_env
        );
    }

    let source = ConfiguredProviderSource::new(config_manager.get(), overrides);
    let analyzer = SleepAnalyzer::new(Arc::new(source));
    let state = AppState::new(analyzer, server);

    run_server(state).await
}
