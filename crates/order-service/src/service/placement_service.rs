//! 下单服务
//!
//! 下单流程按固定顺序执行，不跳步也不调换：
//!
//! 1. 校验用户存在 -> 2. 奖励评估（失败则整体中止）-> 3. 计算金额
//!    -> 4. 写入订单（持久化点）-> 5. 更新用户统计（失败不回滚订单）
//!    -> 6. 确认积分（失败不影响返回结果）-> 7. 返回订单
//!
//! 第 4 步之后的失败只记录日志与 `order_placement_divergence_total` 指标，
//! 由运维按日志人工补偿。

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use order_shared::observability::metrics;
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

use crate::error::{OrderError, Result};
use crate::models::{Cart, NewOrder, Order};
use crate::repository::{OrderRepositoryTrait, UserRepositoryTrait};
use crate::rewards::RewardsCoordinator;

/// 订单金额
///
/// 奖励引擎给出的折扣只是建议值，实际折扣不超过购物车总额，订单金额不为负
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub discount: Decimal,
    pub total: Decimal,
}

impl Pricing {
    pub fn apply(cart_total: Decimal, advised_discount: Decimal) -> Self {
        let discount = advised_discount
            .max(Decimal::ZERO)
            .min(cart_total.max(Decimal::ZERO));
        Self {
            discount,
            total: cart_total - discount,
        }
    }
}

/// 下单服务
pub struct OrderPlacementService {
    user_repo: Arc<dyn UserRepositoryTrait>,
    order_repo: Arc<dyn OrderRepositoryTrait>,
    rewards: Arc<RewardsCoordinator>,
}

impl OrderPlacementService {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryTrait>,
        order_repo: Arc<dyn OrderRepositoryTrait>,
        rewards: Arc<RewardsCoordinator>,
    ) -> Self {
        Self {
            user_repo,
            order_repo,
            rewards,
        }
    }

    /// 下单
    #[instrument(skip(self, cart), fields(cart_total = %cart.total, items = cart.items.len()))]
    pub async fn place_order(&self, user_id: i64, cart: Cart) -> Result<Order> {
        let started = Instant::now();
        let result = self.run_placement(user_id, cart).await;

        let status = match &result {
            Ok(_) => "placed",
            Err(OrderError::UserNotFound(_)) => "user_not_found",
            Err(OrderError::Validation(_)) => "invalid",
            Err(OrderError::RewardsEvaluation(_)) => "rewards_failed",
            Err(_) => "failed",
        };
        metrics::record_order_placement(status, started.elapsed().as_secs_f64());

        result
    }

    async fn run_placement(&self, user_id: i64, cart: Cart) -> Result<Order> {
        if cart.user_id != user_id {
            return Err(OrderError::Validation(format!(
                "购物车所属用户 {} 与下单用户 {} 不一致",
                cart.user_id, user_id
            )));
        }

        // 1. 用户必须存在
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(OrderError::UserNotFound(user_id));
        }

        // 2. 奖励评估，失败直接中止，不落单
        let outcome = self.rewards.evaluate(&cart).await?;

        // 3. 金额
        let pricing = Pricing::apply(cart.total, outcome.discount);
        if pricing.discount != outcome.discount {
            warn!(
                advised = %outcome.discount,
                applied = %pricing.discount,
                "奖励引擎折扣超过购物车总额，已截断"
            );
        }

        // 4. 持久化点
        let order = self
            .order_repo
            .create(&NewOrder::placed(
                user_id,
                cart.items,
                pricing.total,
                pricing.discount,
                Utc::now(),
            ))
            .await?;

        info!(
            order_id = order.id,
            total = %order.total,
            discount = %order.discount,
            campaigns = ?outcome.applied_campaigns,
            "订单已创建"
        );

        // 5. 用户统计，失败不回滚订单
        match self.user_repo.record_order(user_id, order.total).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                error!(order_id = order.id, "订单已创建但用户已不存在，统计未更新");
                metrics::record_placement_divergence("user_stats");
            }
            Err(e) => {
                error!(order_id = order.id, error = %e, "订单已创建但用户统计更新失败");
                metrics::record_placement_divergence("user_stats");
            }
        }

        // 6. 积分确认，失败只记录
        if let Err(e) = self.rewards.confirm_loyalty(user_id, order.total).await {
            warn!(order_id = order.id, error = %e, "订单已创建但积分确认失败");
            metrics::record_placement_divergence("loyalty_confirm");
        }

        Ok(order)
    }

    /// 查询订单
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: i64) -> Result<Order> {
        self.order_repo
            .find_by_id(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartItem, OrderStatus, User};
    use crate::repository::{MockOrderRepositoryTrait, MockUserRepositoryTrait};
    use crate::rewards::dto::SessionEvaluateResponse;
    use crate::rewards::gateway::MockRewardsGateway;
    use crate::rewards::{RewardsError, RewardsOperation};
    use mockall::predicate::*;

    fn test_user(id: i64) -> User {
        let now = Utc::now();
        User {
            id,
            email: format!("user{}@example.com", id),
            name: format!("用户 {}", id),
            total_orders: 0,
            total_spent: Decimal::ZERO,
            loyalty_points: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn cart_of(user_id: i64, total: i64) -> Cart {
        Cart::new(
            user_id,
            vec![CartItem {
                sku: "SKU-1".to_string(),
                name: "键盘".to_string(),
                quantity: 1,
                unit_price: Decimal::from(total),
            }],
            None,
        )
        .unwrap()
    }

    fn session(discount: i64) -> SessionEvaluateResponse {
        SessionEvaluateResponse {
            discount: Decimal::from(discount),
            applied_campaigns: vec!["WELCOME".to_string()],
            loyalty_points_used: 0,
            loyalty_points_earned: 0,
        }
    }

    /// 评估成功的网关，积分确认结果由参数决定
    fn gateway_with(discount: i64, loyalty_ok: bool) -> MockRewardsGateway {
        let mut gateway = MockRewardsGateway::new();
        gateway.expect_upsert_profile().returning(|_, _| Ok(()));
        gateway
            .expect_evaluate_session()
            .returning(move |_| Ok(session(discount)));
        gateway.expect_confirm_loyalty().times(1).returning(move |_, _| {
            if loyalty_ok {
                Ok(())
            } else {
                Err(RewardsError::Transport {
                    operation: RewardsOperation::LoyaltyConfirm,
                    message: "connection reset".to_string(),
                })
            }
        });
        gateway
    }

    fn order_repo_echo() -> MockOrderRepositoryTrait {
        let mut order_repo = MockOrderRepositoryTrait::new();
        order_repo
            .expect_create()
            .times(1)
            .returning(|order| Ok(order.clone().into_order(1)));
        order_repo
    }

    fn service(
        users: MockUserRepositoryTrait,
        orders: MockOrderRepositoryTrait,
        gateway: MockRewardsGateway,
    ) -> OrderPlacementService {
        OrderPlacementService::new(
            Arc::new(users),
            Arc::new(orders),
            Arc::new(RewardsCoordinator::new(Arc::new(gateway))),
        )
    }

    #[test]
    fn test_pricing_within_total() {
        let pricing = Pricing::apply(Decimal::from(100), Decimal::from(20));
        assert_eq!(pricing.discount, Decimal::from(20));
        assert_eq!(pricing.total, Decimal::from(80));
    }

    #[test]
    fn test_pricing_clamps_to_zero() {
        let pricing = Pricing::apply(Decimal::from(30), Decimal::from(45));
        assert_eq!(pricing.discount, Decimal::from(30));
        assert_eq!(pricing.total, Decimal::ZERO);
    }

    #[test]
    fn test_pricing_ignores_negative_discount() {
        let pricing = Pricing::apply(Decimal::from(30), Decimal::from(-5));
        assert_eq!(pricing.discount, Decimal::ZERO);
        assert_eq!(pricing.total, Decimal::from(30));
    }

    #[tokio::test]
    async fn test_place_order_applies_discount_and_updates_stats() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(test_user(id))));
        users
            .expect_record_order()
            .with(eq(1), eq(Decimal::from(80)))
            .times(1)
            .returning(|id, amount| {
                let mut user = test_user(id);
                user.total_orders = 1;
                user.total_spent = amount;
                Ok(Some(user))
            });

        let mut gateway = MockRewardsGateway::new();
        gateway.expect_upsert_profile().times(1).returning(|_, _| Ok(()));
        gateway
            .expect_evaluate_session()
            .times(1)
            .returning(|_| Ok(session(20)));
        gateway
            .expect_confirm_loyalty()
            .withf(|user_id, req| *user_id == 1 && req.total_amount == Decimal::from(80))
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(users, order_repo_echo(), gateway);
        let order = svc.place_order(1, cart_of(1, 100)).await.unwrap();

        assert_eq!(order.total, Decimal::from(80));
        assert_eq!(order.discount, Decimal::from(20));
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.user_id, 1);
        assert_eq!(order.items.len(), 1);
    }

    #[tokio::test]
    async fn test_discount_above_total_yields_zero_total() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id))));
        users
            .expect_record_order()
            .with(eq(1), eq(Decimal::ZERO))
            .times(1)
            .returning(|id, _| Ok(Some(test_user(id))));

        let svc = service(users, order_repo_echo(), gateway_with(150, true));
        let order = svc.place_order(1, cart_of(1, 100)).await.unwrap();

        assert_eq!(order.total, Decimal::ZERO);
        assert_eq!(order.discount, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_unknown_user_fails_fast() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .with(eq(999))
            .returning(|_| Ok(None));
        users.expect_record_order().never();

        let mut orders = MockOrderRepositoryTrait::new();
        orders.expect_create().never();

        let mut gateway = MockRewardsGateway::new();
        gateway.expect_upsert_profile().never();
        gateway.expect_evaluate_session().never();
        gateway.expect_confirm_loyalty().never();

        let svc = service(users, orders, gateway);
        let err = svc.place_order(999, cart_of(999, 100)).await.unwrap_err();

        assert!(matches!(err, OrderError::UserNotFound(999)));
    }

    #[tokio::test]
    async fn test_rewards_failure_creates_no_order() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id))));
        users.expect_record_order().never();

        let mut orders = MockOrderRepositoryTrait::new();
        orders.expect_create().never();

        let mut gateway = MockRewardsGateway::new();
        gateway.expect_upsert_profile().returning(|_, _| Ok(()));
        gateway.expect_evaluate_session().returning(|_| {
            Err(RewardsError::Timeout {
                operation: RewardsOperation::SessionEvaluate,
            })
        });
        gateway.expect_confirm_loyalty().never();

        let svc = service(users, orders, gateway);
        let err = svc.place_order(1, cart_of(1, 100)).await.unwrap_err();

        assert!(matches!(err, OrderError::RewardsEvaluation(_)));
    }

    #[tokio::test]
    async fn test_stats_failure_keeps_order() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id))));
        users
            .expect_record_order()
            .times(1)
            .returning(|_, _| Err(OrderError::Database(sqlx::Error::PoolTimedOut)));

        // 统计失败后仍继续确认积分
        let svc = service(users, order_repo_echo(), gateway_with(0, true));
        let order = svc.place_order(1, cart_of(1, 100)).await.unwrap();

        assert_eq!(order.total, Decimal::from(100));
        assert_eq!(order.status, OrderStatus::Placed);
    }

    #[tokio::test]
    async fn test_loyalty_failure_still_returns_placed_order() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id))));
        users
            .expect_record_order()
            .times(1)
            .returning(|id, _| Ok(Some(test_user(id))));

        let svc = service(users, order_repo_echo(), gateway_with(10, false));
        let order = svc.place_order(1, cart_of(1, 100)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.total, Decimal::from(90));
    }

    #[tokio::test]
    async fn test_order_write_failure_skips_follow_up_steps() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_user(id))));
        users.expect_record_order().never();

        let mut orders = MockOrderRepositoryTrait::new();
        orders
            .expect_create()
            .returning(|_| Err(OrderError::Database(sqlx::Error::PoolTimedOut)));

        let mut gateway = MockRewardsGateway::new();
        gateway.expect_upsert_profile().returning(|_, _| Ok(()));
        gateway
            .expect_evaluate_session()
            .returning(|_| Ok(session(5)));
        gateway.expect_confirm_loyalty().never();

        let svc = service(users, orders, gateway);
        let err = svc.place_order(1, cart_of(1, 100)).await.unwrap_err();

        assert!(matches!(err, OrderError::Database(_)));
    }

    #[tokio::test]
    async fn test_cart_owner_mismatch_is_rejected() {
        let mut users = MockUserRepositoryTrait::new();
        users.expect_find_by_id().never();

        let svc = service(users, MockOrderRepositoryTrait::new(), MockRewardsGateway::new());
        let err = svc.place_order(1, cart_of(2, 100)).await.unwrap_err();

        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let mut orders = MockOrderRepositoryTrait::new();
        orders.expect_find_by_id().with(eq(42)).returning(|_| Ok(None));

        let svc = service(
            MockUserRepositoryTrait::new(),
            orders,
            MockRewardsGateway::new(),
        );
        let err = svc.get_order(42).await.unwrap_err();

        assert!(matches!(err, OrderError::OrderNotFound(42)));
    }
}
