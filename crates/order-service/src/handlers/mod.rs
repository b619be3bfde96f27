//! HTTP 请求处理器

pub mod order;
pub mod rewards;
pub mod user;
