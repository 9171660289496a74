//! friendbook 命令行入口
//!
//! - `serve`：启动 HTTP 服务
//! - `create-user`：直接创建用户（`--staff` 创建管理员）

use anyhow::Result;
use clap::{Parser, Subcommand};
use friendbook::{AppConfig, SocialApp};
use std::time::Duration;
use tracing::info;

/// friendbook 服务端
#[derive(Parser, Debug)]
#[command(name = "friendbook")]
#[command(about = "friendbook - 用户注册、搜索与好友申请服务", long_about = None)]
struct Args {
    /// SQLite 数据库 URL
    #[arg(long, default_value = "sqlite://friendbook.db")]
    db_url: String,

    /// 日志级别（默认: info,friendbook=debug），设置了 RUST_LOG 时以其为准
    #[arg(long, default_value = "info,friendbook=debug")]
    log_level: String,

    /// 额外写入的日志文件（追加模式）
    #[arg(long)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动 HTTP 服务
    Serve {
        /// 监听地址
        #[arg(short, long, default_value = "127.0.0.1:8000")]
        bind: String,

        /// 搜索结果每页条数
        #[arg(long, default_value_t = 10)]
        page_size: u32,

        /// 窗口内允许发送的好友申请数
        #[arg(long, default_value_t = 3)]
        max_requests: i64,

        /// 频率限制窗口（秒）
        #[arg(long, default_value_t = 60)]
        window_secs: u64,
    },
    /// 创建用户
    CreateUser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        password: String,

        /// 创建管理员账号
        #[arg(long)]
        staff: bool,
    },
}

/// 初始化日志（输出到 stdout，指定文件时同时写入文件）
fn init_logger(log_level: &str, log_file: Option<&str>) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 文件不需要颜色
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("无法创建日志文件 {}: {}", path, e))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file {
        info!("[CLI] 📝 日志已同时输出到控制台和文件: {}", path);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level, args.log_file.as_deref())?;

    let mut config = AppConfig::new(args.db_url.clone());

    match args.command {
        Command::Serve {
            bind,
            page_size,
            max_requests,
            window_secs,
        } => {
            config.bind_addr = bind;
            config.page_size = page_size;
            config.rate_limit.max_requests = max_requests;
            config.rate_limit.window = Duration::from_secs(window_secs);

            info!("[CLI] 🗄️  数据库: {}", config.db_url);
            let app = SocialApp::connect(config).await?;
            friendbook::social::server::serve(app).await?;
        }
        Command::CreateUser {
            email,
            name,
            password,
            staff,
        } => {
            let app = SocialApp::connect(config).await?;
            let user = if staff {
                app.identities.create_staff(&email, &name, &password).await?
            } else {
                app.identities.create(&email, &name, &password).await?
            };
            info!(
                "[CLI] ✅ 用户已创建: id={}, email={}, staff={}",
                user.id, user.email, user.is_staff
            );
        }
    }

    Ok(())
}
