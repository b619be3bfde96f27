//! 用户服务

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::error::{OrderError, Result};
use crate::models::{NewUser, User};
use crate::repository::UserRepositoryTrait;

/// 用户服务
pub struct UserService {
    user_repo: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { user_repo }
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(OrderError::UserNotFound(id))
    }

    /// 注册用户
    #[instrument(skip(self, user))]
    pub async fn create_user(&self, user: NewUser) -> Result<User> {
        let created = self.user_repo.create(&user).await?;
        info!(user_id = created.id, "用户已创建");
        Ok(created)
    }

    /// 管理接口：直接覆盖统计值
    #[instrument(skip(self))]
    pub async fn update_stats(
        &self,
        id: i64,
        total_orders: i32,
        total_spent: Decimal,
    ) -> Result<User> {
        if total_orders < 0 || total_spent < Decimal::ZERO {
            return Err(OrderError::Validation(
                "totalOrders 与 totalSpent 不能为负数".to_string(),
            ));
        }

        let user = self
            .user_repo
            .update_stats(id, total_orders, total_spent)
            .await?
            .ok_or(OrderError::UserNotFound(id))?;

        info!(user_id = id, total_orders, total_spent = %total_spent, "用户统计已更新");
        Ok(user)
    }
}
