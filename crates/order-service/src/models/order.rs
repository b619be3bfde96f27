//! 订单模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CartItem;

/// 订单状态
///
/// 下单流程只产生 `Placed`；`Cancelled` 为预留的终态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Placed,
    Cancelled,
}

/// 订单
///
/// 创建后金额不再重算：`total = 购物车总额 - discount`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// 下单时购物车商品的快照
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub discount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// 待写入的订单（id 由存储层分配）
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub discount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// 构造一笔已下单的订单
    pub fn placed(
        user_id: i64,
        items: Vec<CartItem>,
        total: Decimal,
        discount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            items,
            total,
            discount,
            status: OrderStatus::Placed,
            created_at,
        }
    }

    /// 附上存储层分配的 id
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            user_id: self.user_id,
            items: self.items,
            total: self.total,
            discount: self.discount,
            status: self.status,
            created_at: self.created_at,
        }
    }
}
