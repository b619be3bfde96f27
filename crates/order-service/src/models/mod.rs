//! 领域模型
//!
//! 用户聚合、购物车、订单以及奖励评估结果。

mod cart;
mod order;
mod rewards;
mod user;

pub use cart::{Cart, CartItem};
pub use order::{NewOrder, Order, OrderStatus};
pub use rewards::RewardsOutcome;
pub use user::{NewUser, User};
