//! HTTP 接口（axum）
//!
//! 所有响应都使用 `{errCode, errMsg, data}` 包装；需要登录的接口从 `token` 头读取会话。

pub mod account;
pub mod friend;
pub mod health;
pub mod response;
pub mod router;

use crate::social::app::SocialApp;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub use router::build_router;

/// 各 handler 共享的状态
pub type SharedState = Arc<SocialApp>;

/// 在已绑定的监听器上运行服务，`shutdown` 完成后优雅退出
pub async fn serve_with_shutdown<F>(app: SocialApp, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("读取监听地址失败")?;
    let router = build_router(Arc::new(app));
    info!("[HTTP] 🚀 服务已启动: http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP 服务异常退出")?;

    info!("[HTTP] 👋 服务已停止");
    Ok(())
}

/// 绑定配置中的地址并运行，直到收到 Ctrl+C
pub async fn serve(app: SocialApp) -> Result<()> {
    let listener = TcpListener::bind(&app.config.bind_addr)
        .await
        .context(format!("绑定地址失败: {}", app.config.bind_addr))?;

    serve_with_shutdown(app, listener, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("[HTTP] 收到退出信号");
    })
    .await
}
