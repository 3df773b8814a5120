//! HTTP Server - 睡眠分析 REST API

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{analyze_sleep_handler, health_handler};
use crate::state::AppState;

/// 运行 HTTP 服务器
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.server.host, state.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("SonoZen server starting on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 创建路由
pub fn create_router(state: AppState) -> Router {
    let cors = state.server.cors;
    let state = Arc::new(state);

    let router = Router::new()
        // 健康检查
        .route("/health", get(health_handler))
        // 睡眠分析
        .route(sonozen_core::ANALYZE_PATH, post(analyze_sleep_handler))
        // 中间件
        .layer(TraceLayer::new_for_http());

    let router = if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
