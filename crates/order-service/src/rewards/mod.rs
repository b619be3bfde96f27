//! 奖励引擎集成
//!
//! - `gateway`：出站 HTTP 调用与边界校验
//! - `coordinator`：评估与积分确认的调用顺序
//! - `dto`：各操作的请求/响应结构

pub mod coordinator;
pub mod dto;
pub mod error;
pub mod gateway;

pub use coordinator::RewardsCoordinator;
pub use error::{RewardsError, RewardsOperation};
pub use gateway::{HttpRewardsGateway, RewardsGateway};
