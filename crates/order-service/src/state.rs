//! 应用状态定义
//!
//! 包含 Axum 路由共享的服务实例

use std::sync::Arc;

use crate::repository::{OrderRepositoryTrait, UserRepositoryTrait};
use crate::rewards::{RewardsCoordinator, RewardsGateway};
use crate::service::{OrderPlacementService, UserService};

/// Axum 应用共享状态
///
/// 所有依赖在启动时组装完毕，之后只读共享
#[derive(Clone)]
pub struct AppState {
    pub placement: Arc<OrderPlacementService>,
    pub users: Arc<UserService>,
    pub rewards: Arc<RewardsCoordinator>,
}

impl AppState {
    /// 由仓储与奖励网关组装服务
    pub fn new(
        user_repo: Arc<dyn UserRepositoryTrait>,
        order_repo: Arc<dyn OrderRepositoryTrait>,
        gateway: Arc<dyn RewardsGateway>,
    ) -> Self {
        let rewards = Arc::new(RewardsCoordinator::new(gateway));
        let placement = Arc::new(OrderPlacementService::new(
            user_repo.clone(),
            order_repo,
            rewards.clone(),
        ));
        let users = Arc::new(UserService::new(user_repo));

        Self {
            placement,
            users,
            rewards,
        }
    }
}
