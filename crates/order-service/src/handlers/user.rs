//! 用户 API 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    dto::{ApiResponse, CreateUserRequest, UpdateUserStatsRequest},
    error::OrderError,
    models::User,
    state::AppState,
};

/// 注册用户
///
/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), OrderError> {
    req.validate()?;

    let user = state.users.create_user(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, OrderError> {
    let user = state.users.get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// 覆盖用户统计
///
/// PUT /users/{id}
pub async fn update_user_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserStatsRequest>,
) -> Result<Json<ApiResponse<User>>, OrderError> {
    req.validate()?;

    let user = state
        .users
        .update_stats(id, req.total_orders, req.total_spent)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}
