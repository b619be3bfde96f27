//! 订单仓储
//!
//! 订单头与商品快照在同一事务中写入

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use super::traits::OrderRepositoryTrait;
use crate::error::Result;
use crate::models::{CartItem, NewOrder, Order, OrderStatus};

/// 订单仓储
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建订单
    ///
    /// 商品按购物车顺序写入 position，读取时按 position 还原
    pub async fn create(&self, order: &NewOrder) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO orders (user_id, total, discount, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(order.total)
        .bind(order.discount)
        .bind(order.status)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;
        let order_id: i64 = row.get("id");

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, sku, name, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(position as i32)
            .bind(&item.sku)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order.clone().into_order(order_id))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        let Some(row) = sqlx::query(
            r#"
            SELECT id, user_id, total, discount, status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query(
            r#"
            SELECT sku, name, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|r| CartItem {
            sku: r.get("sku"),
            name: r.get("name"),
            quantity: r.get("quantity"),
            unit_price: r.get("unit_price"),
        })
        .collect();

        Ok(Some(Order {
            id: row.get("id"),
            user_id: row.get("user_id"),
            items,
            total: row.get::<Decimal, _>("total"),
            discount: row.get::<Decimal, _>("discount"),
            status: row.get::<OrderStatus, _>("status"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }))
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order> {
        self.create(order).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        self.find_by_id(id).await
    }
}
