//! 奖励评估 API 处理器

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    dto::{ApiResponse, CartRequest},
    error::OrderError,
    models::RewardsOutcome,
    state::AppState,
};

/// 评估购物车可用的奖励，不下单
///
/// POST /rewards/evaluate
pub async fn evaluate(
    State(state): State<AppState>,
    Json(req): Json<CartRequest>,
) -> Result<Json<ApiResponse<RewardsOutcome>>, OrderError> {
    req.validate()?;

    let cart = req.into_owned_cart()?;
    let outcome = state.rewards.evaluate(&cart).await?;

    Ok(Json(ApiResponse::success(outcome)))
}
