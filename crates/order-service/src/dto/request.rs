//! API 请求结构
//!
//! 字段校验在 handler 入口通过 `validator` 完成，服务层只接收已校验的领域对象

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{OrderError, Result};
use crate::models::{Cart, CartItem, NewUser};

/// 金额不能为负
pub fn validate_non_negative(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("金额不能为负数".into());
        return Err(err);
    }
    Ok(())
}

/// 购物车商品
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    #[validate(length(min = 1, max = 64, message = "sku 长度必须在1-64个字符之间"))]
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "商品名称长度必须在1-255个字符之间"))]
    pub name: String,
    #[validate(range(min = 1, message = "商品数量必须大于0"))]
    pub quantity: i32,
    #[serde(alias = "price")]
    #[validate(custom(function = "validate_non_negative"))]
    pub unit_price: Decimal,
}

impl From<CartItemRequest> for CartItem {
    fn from(req: CartItemRequest) -> Self {
        Self {
            sku: req.sku,
            name: req.name,
            quantity: req.quantity,
            unit_price: req.unit_price,
        }
    }
}

/// 购物车
///
/// `total` 缺省时按商品行金额求和
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub user_id: Option<i64>,
    #[validate(length(min = 1, message = "购物车不能为空"), nested)]
    pub items: Vec<CartItemRequest>,
    #[validate(custom(function = "validate_non_negative"))]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub coupon_codes: Vec<String>,
}

impl CartRequest {
    /// 转换为领域购物车
    ///
    /// 购物车自带 userId 时以其为所属用户，否则归属 `user_id`；
    /// 所属用户与下单用户是否一致由下单服务校验
    pub fn into_cart(self, user_id: i64) -> Result<Cart> {
        let owner = self.user_id.unwrap_or(user_id);
        let items = self.items.into_iter().map(CartItem::from).collect();
        Ok(Cart::new(owner, items, self.total)?.with_coupon_codes(self.coupon_codes))
    }

    /// 使用购物车自带的 userId 转换
    pub fn into_owned_cart(self) -> Result<Cart> {
        let user_id = self
            .user_id
            .ok_or_else(|| OrderError::Validation("userId 不能为空".to_string()))?;
        self.into_cart(user_id)
    }
}

/// 下单请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: i64,
    #[serde(alias = "cartRequest")]
    #[validate(nested)]
    pub cart: CartRequest,
}

/// 注册用户请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "用户名长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(range(min = 0, message = "积分不能为负数"))]
    pub loyalty_points: Option<i32>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            loyalty_points: req.loyalty_points.unwrap_or(0),
        }
    }
}

/// 管理接口：覆盖用户统计
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatsRequest {
    #[validate(range(min = 0, message = "订单数不能为负数"))]
    pub total_orders: i32,
    #[validate(custom(function = "validate_non_negative"))]
    pub total_spent: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_body() -> serde_json::Value {
        json!({
            "userId": 1,
            "cart": {
                "items": [
                    {"sku": "SKU-1", "name": "鼠标", "quantity": 2, "unitPrice": 25},
                    {"sku": "SKU-2", "name": "鼠标垫", "quantity": 1, "price": 50}
                ]
            }
        })
    }

    #[test]
    fn test_place_order_request_valid() {
        let req: PlaceOrderRequest = serde_json::from_value(order_body()).unwrap();
        assert!(req.validate().is_ok());

        let cart = req.cart.into_cart(req.user_id).unwrap();
        assert_eq!(cart.user_id, 1);
        assert_eq!(cart.total, Decimal::from(100));
        assert_eq!(cart.items[1].unit_price, Decimal::from(50));
    }

    #[test]
    fn test_cart_request_alias() {
        let req: PlaceOrderRequest = serde_json::from_value(json!({
            "userId": 1,
            "cartRequest": {"items": [{"sku": "A", "name": "a", "quantity": 1, "price": 1}]}
        }))
        .unwrap();
        assert_eq!(req.cart.items.len(), 1);
    }

    #[test]
    fn test_empty_items_rejected() {
        let req: PlaceOrderRequest =
            serde_json::from_value(json!({"userId": 1, "cart": {"items": []}})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut body = order_body();
        body["cart"]["items"][0]["quantity"] = json!(0);
        let req: PlaceOrderRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_price_and_total_rejected() {
        let mut body = order_body();
        body["cart"]["items"][0]["unitPrice"] = json!(-1);
        let req: PlaceOrderRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());

        let mut body = order_body();
        body["cart"]["total"] = json!(-10);
        let req: PlaceOrderRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_cart_keeps_its_own_owner() {
        let mut body = order_body();
        body["cart"]["userId"] = json!(2);
        let req: PlaceOrderRequest = serde_json::from_value(body).unwrap();
        let cart = req.cart.into_cart(req.user_id).unwrap();
        assert_eq!(cart.user_id, 2);
    }

    #[test]
    fn test_overflowing_cart_passes_validation_but_fails_conversion() {
        let req: PlaceOrderRequest = serde_json::from_value(json!({
            "userId": 1,
            "cart": {"items": [{"sku": "A", "name": "a", "quantity": 2, "unitPrice": 5e28}]}
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let err = req.cart.into_cart(1).unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn test_cart_item_serializes_for_validation_params() {
        let req: CartRequest = serde_json::from_value(json!({"items": []})).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));

        let item: CartItemRequest = serde_json::from_value(
            json!({"sku": "A", "name": "a", "quantity": 1, "price": 3}),
        )
        .unwrap();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["unitPrice"], json!(3.0));
    }

    #[test]
    fn test_supplied_total_is_kept() {
        let mut body = order_body();
        body["cart"]["total"] = json!(90);
        let req: PlaceOrderRequest = serde_json::from_value(body).unwrap();
        let cart = req.cart.into_cart(1).unwrap();
        assert_eq!(cart.total, Decimal::from(90));
    }

    #[test]
    fn test_owned_cart_requires_user_id() {
        let req: CartRequest = serde_json::from_value(json!({
            "items": [{"sku": "A", "name": "a", "quantity": 1, "price": 1}]
        }))
        .unwrap();
        assert!(matches!(
            req.into_owned_cart().unwrap_err(),
            OrderError::Validation(_)
        ));
    }

    #[test]
    fn test_create_user_request_validation() {
        let req: CreateUserRequest =
            serde_json::from_value(json!({"email": "not-an-email", "name": "Alice"})).unwrap();
        assert!(req.validate().is_err());

        let req: CreateUserRequest =
            serde_json::from_value(json!({"email": "alice@example.com", "name": "Alice"}))
                .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(NewUser::from(req).loyalty_points, 0);
    }

    #[test]
    fn test_update_stats_request_validation() {
        let req: UpdateUserStatsRequest =
            serde_json::from_value(json!({"totalOrders": -1, "totalSpent": 10})).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateUserStatsRequest =
            serde_json::from_value(json!({"totalOrders": 3, "totalSpent": 10.5})).unwrap();
        assert!(req.validate().is_ok());
    }
}
