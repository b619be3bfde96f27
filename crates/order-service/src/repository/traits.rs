//! 仓储 Trait 定义
//!
//! 服务层只依赖这些接口，PostgreSQL 与内存实现可互换

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{NewOrder, NewUser, Order, User};

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// 创建用户，邮箱重复返回 `EmailAlreadyExists`
    async fn create(&self, user: &NewUser) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 管理接口：直接覆盖订单数与累计消费
    async fn update_stats(
        &self,
        id: i64,
        total_orders: i32,
        total_spent: Decimal,
    ) -> Result<Option<User>>;

    /// 计入一笔订单：订单数 +1，累计消费 +amount，单次原子操作
    async fn record_order(&self, id: i64, amount: Decimal) -> Result<Option<User>>;
}

/// 订单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    /// 写入订单及商品快照，返回带 id 的订单
    async fn create(&self, order: &NewOrder) -> Result<Order>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>>;
}
