//! 内存仓储
//!
//! 基于 DashMap 实现的仓储，适用于测试和本地体验，进程退出即丢失。

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;

use super::traits::{OrderRepositoryTrait, UserRepositoryTrait};
use crate::error::{OrderError, Result};
use crate::models::{NewOrder, NewUser, Order, User};

/// 内存用户仓储
///
/// 邮箱索引与用户表分开存放，创建用户时先占用邮箱再分配 id
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: DashMap<i64, User>,
    emails: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接放入一个完整的用户（测试预置数据用）
    pub fn insert(&self, user: User) {
        self.next_id.fetch_max(user.id, Ordering::SeqCst);
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let id = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(OrderError::EmailAlreadyExists(user.email.clone())),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                slot.insert(id);
                id
            }
        };

        let now = Utc::now();
        let created = User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            total_orders: 0,
            total_spent: Decimal::ZERO,
            loyalty_points: user.loyalty_points,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn update_stats(
        &self,
        id: i64,
        total_orders: i32,
        total_spent: Decimal,
    ) -> Result<Option<User>> {
        Ok(self.users.get_mut(&id).map(|mut u| {
            u.total_orders = total_orders;
            u.total_spent = total_spent;
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn record_order(&self, id: i64, amount: Decimal) -> Result<Option<User>> {
        // get_mut 持有分片写锁，递增在锁内完成
        let Some(mut user) = self.users.get_mut(&id) else {
            return Ok(None);
        };
        let (Some(total_orders), Some(total_spent)) = (
            user.total_orders.checked_add(1),
            user.total_spent.checked_add(amount),
        ) else {
            return Err(OrderError::Validation(format!("用户 {} 累计统计溢出", id)));
        };
        user.total_orders = total_orders;
        user.total_spent = total_spent;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

/// 内存订单仓储
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: DashMap<i64, Order>,
    next_id: AtomicI64,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.orders.len()
    }

    /// 列出某用户的全部订单，按 id 升序
    pub fn list_by_user(&self, user_id: i64) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|o| o.id);
        orders
    }
}

#[async_trait]
impl OrderRepositoryTrait for InMemoryOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order = order.clone().into_order(id);
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        Ok(self.orders.get(&id).map(|o| o.clone()))
    }
}
