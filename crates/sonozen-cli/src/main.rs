use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use sonozen_cli::pages::{SubmitOutcome, SubmitPage};
use sonozen_cli::{App, Route};
use sonozen_config::{Config, ConfigManager};
use sonozen_storage::FileStorage;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sonozen")]
#[command(about = "SonoZen sleep analysis client")]
#[command(version)]
struct Cli {
    /// 分析服务地址（覆盖 client.server_url）
    #[arg(long, env = "SONOZEN_SERVER_URL")]
    server_url: Option<String>,

    /// 启用调试模式
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// 配置文件路径
    #[arg(long, env = "SONOZEN_CONFIG", default_value = "~/.sonozen/config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 首页
    Home,
    /// 账户：登录、登出、状态
    Auth(AuthArgs),
    /// 提交睡眠描述并获取分析
    Analyze {
        /// 睡眠问题描述，省略时从标准输入读取
        message: Option<String>,
    },
    /// 查看分析历史
    Dashboard,
    /// 配置管理命令
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Subcommand, Clone)]
enum AuthCommands {
    /// 邮箱密码登录
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "SONOZEN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// 登出
    Logout,
    /// 查看当前会话
    Status,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// 获取配置值
    Get {
        /// 配置键 (如: client.server_url, llm.model)
        key: String,
    },
    /// 设置配置值
    Set {
        /// 配置键 (如: client.server_url, llm.model)
        key: String,
        /// 配置值
        value: String,
    },
    /// 初始化默认配置
    Init {
        /// 强制覆盖已有配置
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// 显示当前配置
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // 展开配置文件路径
    let config_path =
        sonozen_config::expand_tilde(&cli.config).unwrap_or_else(|| PathBuf::from(&cli.config));

    if cli.debug {
        eprintln!("{}", "[DEBUG] Debug mode enabled".dimmed());
        eprintln!("{}", format!("[DEBUG] Config path: {:?}", config_path).dimmed());
    }

    let command = match cli.command {
        Commands::Config(args) => return handle_config(args, config_path).await,
        command => command,
    };

    let mut config = ConfigManager::load(&config_path).await?.snapshot().await;
    if let Some(url) = cli.server_url.as_deref() {
        config.client.server_url = url.to_string();
    }

    let app = build_app(&config, cli.debug).await?;

    match command {
        Commands::Home => show(&app, Route::Landing).await,
        Commands::Dashboard => show(&app, Route::Dashboard).await,
        Commands::Analyze { message } => analyze(&app, message).await,
        Commands::Auth(args) => handle_auth(&app, args).await,
        Commands::Config(_) => Ok(()),
    }
}

async fn build_app(config: &Config, debug: bool) -> anyhow::Result<App> {
    let storage_dir = sonozen_config::storage_dir(&config.client)
        .ok_or_else(|| anyhow::anyhow!("Could not find home directory for local storage"))?;

    if debug {
        eprintln!("{}", format!("[DEBUG] Server URL: {}", config.client.server_url).dimmed());
        eprintln!("{}", format!("[DEBUG] Storage dir: {:?}", storage_dir).dimmed());
    }

    let storage = FileStorage::new(storage_dir);
    storage.init().await?;

    Ok(App::from_config(config, Arc::new(storage)))
}

async fn show(app: &App, route: Route) -> anyhow::Result<()> {
    let visit = app.visit(route).await;
    print!("{}", visit.output);
    Ok(())
}

async fn analyze(app: &App, message: Option<String>) -> anyhow::Result<()> {
    // 受保护页面：未登录时跳转
    let landing = app.resolve(Route::Analysis).await;
    if landing != Route::Analysis {
        return show(app, landing).await;
    }

    let message = match message {
        Some(message) => message,
        None => read_stdin()?,
    };

    let page = SubmitPage::new(message);
    println!("{}", "🌙 Analyzing your sleep...".cyan());

    match app.analyze(&page).await {
        (SubmitOutcome::Navigate(_), Some(visit)) => {
            print!("{}", visit.output);
            Ok(())
        }
        _ => {
            if let Some(error) = page.error() {
                eprintln!("{}", format!("❌ {}", error).red());
            }
            let input = page.input();
            if !input.trim().is_empty() {
                eprintln!("{}", "Your description was kept:".dimmed());
                eprintln!("{}", input);
            }
            std::process::exit(1);
        }
    }
}

async fn handle_auth(app: &App, args: AuthArgs) -> anyhow::Result<()> {
    match args.command {
        AuthCommands::Status => {
            println!("{}", app.status().await);
        }
        AuthCommands::Login { email, password } => {
            let landing = app.resolve(Route::Auth).await;
            let Some(identity) = app.identity().filter(|_| landing == Route::Auth) else {
                // 未配置身份服务或已登录
                return show(app, landing).await;
            };

            let email = match email {
                Some(email) => email,
                None => prompt("Email: ")?,
            };
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };

            match identity.sign_in_with_password(email.trim(), &password).await {
                Ok(_) => show(app, Route::Dashboard).await?,
                Err(e) => {
                    eprintln!("{}", format!("❌ {}", e).red());
                    std::process::exit(1);
                }
            }
        }
        AuthCommands::Logout => {
            if let Some(identity) = app.identity() {
                identity.sign_out().await?;
            }
            show(app, Route::Landing).await?;
        }
    }
    Ok(())
}

async fn handle_config(args: ConfigArgs, config_path: PathBuf) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Get { key } => {
            let manager = ConfigManager::load(&config_path).await?;
            let config = manager.snapshot().await;

            match config.get_value(&key) {
                Some(value) => {
                    println!("{}", format!("{} = {}", key, value).green());
                }
                None => {
                    println!("{}", format!("❌ Key not found: {}", key).red());
                    std::process::exit(1);
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let manager = ConfigManager::load(&config_path).await?;

            if let Err(e) = manager.update(|config| config.set_value(&key, &value)).await {
                eprintln!("{}", format!("❌ Failed to set value: {}", e).red());
                std::process::exit(1);
            }
            println!("{}", format!("✅ Set {} = {}", key, value).green());
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                println!("{}", format!("⚠️  Config already exists at {:?}", config_path).yellow());
                println!("{}", "Use --force to overwrite".dimmed());
                return Ok(());
            }

            // 初始化目录
            sonozen_config::init_sonozen_dirs().await?;

            let manager = ConfigManager::new(Config::default(), config_path.clone());
            manager.save().await?;

            println!("{}", format!("✅ Config initialized at {:?}", config_path).green());
            println!("{}", "You can edit this file to customize your settings".dimmed());
        }
        ConfigCommands::Show => {
            let manager = ConfigManager::load(&config_path).await?;
            let config = manager.snapshot().await;

            println!("{}", "📋 Current Configuration:".cyan().bold());
            println!();
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label.cyan());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn read_stdin() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input)
}
