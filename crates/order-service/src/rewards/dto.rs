//! 奖励引擎请求/响应结构
//!
//! 每个操作一套明确的 schema，响应在网关边界完成校验。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::validate_non_negative;
use crate::models::{Cart, CartItem, RewardsOutcome};

/// 用户画像更新（PUT /v1/profiles/{userId}）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub user_id: String,
    pub cart_total: Decimal,
    pub cart_item_count: i64,
}

impl ProfileUpdateRequest {
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            user_id: cart.user_id.to_string(),
            cart_total: cart.total,
            cart_item_count: cart.item_count(),
        }
    }
}

/// 会话商品
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionItem {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl From<&CartItem> for SessionItem {
    fn from(item: &CartItem) -> Self {
        Self {
            sku: item.sku.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.unit_price,
        }
    }
}

/// 会话评估（POST /v1/sessions）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvaluateRequest {
    /// 每次评估新生成
    pub session_id: String,
    pub user_id: String,
    pub items: Vec<SessionItem>,
    pub total: Decimal,
    pub coupon_codes: Vec<String>,
}

impl SessionEvaluateRequest {
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id: cart.user_id.to_string(),
            items: cart.items.iter().map(SessionItem::from).collect(),
            total: cart.total,
            coupon_codes: cart.coupon_codes.clone(),
        }
    }
}

/// 会话评估响应
///
/// 未知字段忽略；折扣与积分必须非负
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvaluateResponse {
    #[validate(custom(function = "validate_non_negative"))]
    pub discount: Decimal,
    #[serde(default)]
    pub applied_campaigns: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "loyaltyPointsUsed 不能为负数"))]
    pub loyalty_points_used: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "loyaltyPointsEarned 不能为负数"))]
    pub loyalty_points_earned: i32,
}

impl From<SessionEvaluateResponse> for RewardsOutcome {
    fn from(resp: SessionEvaluateResponse) -> Self {
        Self {
            discount: resp.discount,
            applied_campaigns: resp.applied_campaigns,
            loyalty_points_used: resp.loyalty_points_used,
            loyalty_points_earned: resp.loyalty_points_earned,
        }
    }
}

/// 积分确认（POST /v1/loyalty/{userId}/confirm）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyConfirmRequest {
    pub total_amount: Decimal,
}
