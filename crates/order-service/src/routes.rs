//! 路由配置模块

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use order_shared::{database::Database, observability::middleware as obs_middleware};

use crate::{handlers, state::AppState};

/// 业务路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 订单
        .route("/orders", post(handlers::order::place_order))
        .route("/orders/{id}", get(handlers::order::get_order))
        // 奖励
        .route("/rewards/evaluate", post(handlers::rewards::evaluate))
        // 用户
        .route("/users", post(handlers::user::create_user))
        .route(
            "/users/{id}",
            get(handlers::user::get_user).put(handlers::user::update_user_stats),
        )
}

/// 完整应用：业务路由 + 探针 + 可观测性中间件
///
/// 传入数据库时挂载 `/ready`，所有路由共用同一组中间件
pub fn app(state: AppState, db: Option<Database>) -> Router {
    let mut router = Router::new()
        .merge(api_routes())
        .route("/health", get(health_check))
        .with_state(state);

    if let Some(db) = db {
        router = router.route("/ready", get(move || readiness_check(db.clone())));
    }

    router
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "order-service"
    }))
}

/// 就绪探针：检查数据库连接是否可用
async fn readiness_check(db: Database) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = db.health_check().await.is_ok();
    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "service": "order-service",
            "checks": {
                "database": if db_ok { "ok" } else { "fail" }
            }
        })),
    )
}
