//! 订单服务
//!
//! 接收下单请求，调用外部奖励引擎计算折扣与积分，持久化订单并维护用户统计。
//!
//! ## 模块结构
//!
//! - `models`: 用户、购物车、订单等领域模型
//! - `repository`: PostgreSQL 与内存仓储
//! - `rewards`: 奖励引擎网关与协调器
//! - `service`: 下单流程与用户服务
//! - `dto` / `handlers` / `routes` / `state`: HTTP 接口层
//!
//! ## 下单一致性
//!
//! 订单写入是唯一的持久化点；用户统计与积分确认是后续的尽力而为步骤，
//! 失败时记录日志和分歧指标，不回滚订单。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod rewards;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{OrderError, Result};
pub use models::{Cart, CartItem, Order, OrderStatus, RewardsOutcome, User};
pub use state::AppState;
