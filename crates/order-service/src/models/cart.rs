//! 购物车
//!
//! 购物车只存在于一次下单请求的生命周期内，不直接持久化。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};

/// 购物车商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl CartItem {
    /// 行金额 = 单价 × 数量，超出 Decimal 表示范围时返回 None
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// 购物车
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: i64,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    /// 透传给奖励引擎的优惠码
    #[serde(default)]
    pub coupon_codes: Vec<String>,
}

impl Cart {
    /// 创建购物车
    ///
    /// 客户端未提供总额时按商品行金额求和
    pub fn new(user_id: i64, items: Vec<CartItem>, total: Option<Decimal>) -> Result<Self> {
        let total = match total {
            Some(total) => total,
            None => Self::items_total(&items)
                .ok_or_else(|| OrderError::Validation("购物车金额超出可表示范围".to_string()))?,
        };
        Ok(Self {
            user_id,
            items,
            total,
            coupon_codes: Vec::new(),
        })
    }

    pub fn with_coupon_codes(mut self, coupon_codes: Vec<String>) -> Self {
        self.coupon_codes = coupon_codes;
        self
    }

    /// 商品行金额之和
    pub fn items_total(items: &[CartItem]) -> Option<Decimal> {
        items.iter().try_fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.line_total()?)
        })
    }

    /// 商品件数之和
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }
}
