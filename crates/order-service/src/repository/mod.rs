//! 数据库仓储层
//!
//! 提供用户与订单的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 用户统计通过单条 UPDATE 原子递增，不做读-改-写
//! - 定义 trait 接口以支持 mock 测试与内存实现

mod memory;
mod order_repo;
mod traits;
mod user_repo;

pub use memory::{InMemoryOrderRepository, InMemoryUserRepository};
pub use order_repo::OrderRepository;
pub use traits::*;
pub use user_repo::UserRepository;
