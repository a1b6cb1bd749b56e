use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::config::Config;
use crate::error::ConfigError;
use crate::http::routes::{build_router, AppState};

/// 启动 HTTP 服务，直到收到退出信号
pub async fn serve(config: &Config) -> Result<()> {
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|_| ConfigError::InvalidBindAddr {
            addr: config.bind_addr.clone(),
        })?;

    let router = build_router(AppState::from_config(config));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听地址: {}", addr))?;

    info!("✓ HTTP 服务已启动: http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;
    info!("HTTP 服务已退出");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
