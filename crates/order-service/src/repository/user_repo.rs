//! 用户仓储

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::traits::UserRepositoryTrait;
use crate::error::{OrderError, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str =
    "id, email, name, total_orders, total_spent, loyalty_points, created_at, updated_at";

/// 用户仓储
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建用户
    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (email, name, loyalty_points)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.loyalty_points)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return OrderError::EmailAlreadyExists(user.email.clone());
                    }
                }
                OrderError::Database(e)
            })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// 覆盖统计字段
    pub async fn update_stats(
        &self,
        id: i64,
        total_orders: i32,
        total_spent: Decimal,
    ) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET total_orders = $2, total_spent = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(total_orders)
            .bind(total_spent)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// 原子递增订单统计
    ///
    /// 并发下单时由数据库行锁串行化，不会丢失更新
    pub async fn record_order(&self, id: i64, amount: Decimal) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET total_orders = total_orders + 1,
                total_spent = total_spent + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: &NewUser) -> Result<User> {
        self.create(user).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_by_id(id).await
    }

    async fn update_stats(
        &self,
        id: i64,
        total_orders: i32,
        total_spent: Decimal,
    ) -> Result<Option<User>> {
        self.update_stats(id, total_orders, total_spent).await
    }

    async fn record_order(&self, id: i64, amount: Decimal) -> Result<Option<User>> {
        self.record_order(id, amount).await
    }
}
