//! 订单服务
//!
//! 提供下单、订单查询、奖励评估与用户管理 REST API。

use std::sync::Arc;

use order_service::{
    repository::{OrderRepository, UserRepository},
    rewards::HttpRewardsGateway,
    routes,
    state::AppState,
};
use order_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 配置一次性加载，之后只以不可变值注入各组件
    let config = AppConfig::load("order-service")?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        rewards = ?config.rewards,
        "Starting order-service on {}",
        config.server_addr()
    );

    // 基础设施
    let db = Database::connect(&config.database).await?;
    db.run_migrations(&sqlx::migrate!()).await?;

    // 奖励引擎客户端在配置就绪后显式构造
    let gateway = Arc::new(HttpRewardsGateway::new(&config.rewards)?);

    let state = AppState::new(
        Arc::new(UserRepository::new(db.pool().clone())),
        Arc::new(OrderRepository::new(db.pool().clone())),
        gateway,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::app(state, Some(db.clone())).layer(cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
