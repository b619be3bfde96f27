//! 奖励协调器
//!
//! 把购物车翻译成奖励引擎的请求序列，并把引擎响应归一化为 `RewardsOutcome`。

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::dto::{LoyaltyConfirmRequest, ProfileUpdateRequest, SessionEvaluateRequest};
use super::error::RewardsError;
use super::gateway::RewardsGateway;
use crate::models::{Cart, RewardsOutcome};

/// 奖励协调器
pub struct RewardsCoordinator {
    gateway: Arc<dyn RewardsGateway>,
}

impl RewardsCoordinator {
    pub fn new(gateway: Arc<dyn RewardsGateway>) -> Self {
        Self { gateway }
    }

    /// 评估购物车
    ///
    /// 先同步用户画像，再发起会话评估；任一步失败都直接返回错误，不重试
    #[instrument(skip(self, cart), fields(user_id = cart.user_id, items = cart.items.len()))]
    pub async fn evaluate(&self, cart: &Cart) -> Result<RewardsOutcome, RewardsError> {
        self.gateway
            .upsert_profile(cart.user_id, &ProfileUpdateRequest::from_cart(cart))
            .await?;

        let response = self
            .gateway
            .evaluate_session(&SessionEvaluateRequest::from_cart(cart))
            .await?;

        let outcome = RewardsOutcome::from(response);
        debug!(
            discount = %outcome.discount,
            campaigns = outcome.applied_campaigns.len(),
            "奖励评估完成"
        );
        Ok(outcome)
    }

    /// 确认积分消耗
    #[instrument(skip(self))]
    pub async fn confirm_loyalty(&self, user_id: i64, total: Decimal) -> Result<(), RewardsError> {
        self.gateway
            .confirm_loyalty(
                user_id,
                &LoyaltyConfirmRequest {
                    total_amount: total,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartItem;
    use crate::rewards::dto::SessionEvaluateResponse;
    use crate::rewards::gateway::MockRewardsGateway;
    use crate::rewards::RewardsOperation;
    use mockall::Sequence;
    use mockall::predicate::*;

    fn cart() -> Cart {
        Cart::new(
            3,
            vec![CartItem {
                sku: "SKU-9".to_string(),
                name: "台灯".to_string(),
                quantity: 2,
                unit_price: Decimal::from(50),
            }],
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_updates_profile_before_session() {
        let mut gateway = MockRewardsGateway::new();
        let mut seq = Sequence::new();

        gateway
            .expect_upsert_profile()
            .with(eq(3), always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        gateway
            .expect_evaluate_session()
            .withf(|req| req.user_id == "3" && req.total == Decimal::from(100))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(SessionEvaluateResponse {
                    discount: Decimal::from(20),
                    applied_campaigns: vec!["SPRING".to_string()],
                    loyalty_points_used: 10,
                    loyalty_points_earned: 4,
                })
            });

        let coordinator = RewardsCoordinator::new(Arc::new(gateway));
        let outcome = coordinator.evaluate(&cart()).await.unwrap();

        assert_eq!(outcome.discount, Decimal::from(20));
        assert_eq!(outcome.applied_campaigns, vec!["SPRING".to_string()]);
        assert_eq!(outcome.loyalty_points_used, 10);
        assert_eq!(outcome.loyalty_points_earned, 4);
    }

    #[tokio::test]
    async fn test_profile_failure_skips_session() {
        let mut gateway = MockRewardsGateway::new();
        gateway.expect_upsert_profile().times(1).returning(|_, _| {
            Err(RewardsError::Transport {
                operation: RewardsOperation::ProfileUpdate,
                message: "connection refused".to_string(),
            })
        });
        gateway.expect_evaluate_session().never();

        let coordinator = RewardsCoordinator::new(Arc::new(gateway));
        let err = coordinator.evaluate(&cart()).await.unwrap_err();

        assert_eq!(err.operation(), Some(RewardsOperation::ProfileUpdate));
    }

    #[tokio::test]
    async fn test_confirm_loyalty_passes_total() {
        let mut gateway = MockRewardsGateway::new();
        gateway
            .expect_confirm_loyalty()
            .withf(|user_id, req| *user_id == 3 && req.total_amount == Decimal::from(80))
            .times(1)
            .returning(|_, _| Ok(()));

        let coordinator = RewardsCoordinator::new(Arc::new(gateway));
        coordinator
            .confirm_loyalty(3, Decimal::from(80))
            .await
            .unwrap();
    }
}
