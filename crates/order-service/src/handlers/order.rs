//! 订单 API 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    dto::{ApiResponse, PlaceOrderRequest},
    error::OrderError,
    models::Order,
    state::AppState,
};

/// 下单
///
/// POST /orders
pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), OrderError> {
    req.validate()?;

    let cart = req.cart.into_cart(req.user_id)?;
    let order = state.placement.place_order(req.user_id, cart).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// 查询订单
///
/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Order>>, OrderError> {
    let order = state.placement.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}
