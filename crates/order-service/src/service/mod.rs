//! 服务层
//!
//! 协调仓储层与奖励引擎，实现下单与用户管理的业务逻辑。
//!
//! ## 模块结构
//!
//! - `placement_service`: 下单流程（奖励评估 -> 落单 -> 统计 -> 积分确认）
//! - `user_service`: 用户查询、注册与统计维护

pub mod placement_service;
pub mod user_service;

pub use placement_service::{OrderPlacementService, Pricing};
pub use user_service::UserService;
