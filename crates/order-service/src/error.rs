//! 订单服务错误类型定义

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::rewards::RewardsError;

/// 订单服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    // 资源不存在
    #[error("用户不存在: {0}")]
    UserNotFound(i64),
    #[error("订单不存在: {0}")]
    OrderNotFound(i64),

    // 业务错误
    #[error("邮箱已被注册: {0}")]
    EmailAlreadyExists(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 外部依赖
    #[error("奖励评估失败: {0}")]
    RewardsEvaluation(#[from] RewardsError),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl OrderError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UserNotFound(_) | Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmailAlreadyExists(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RewardsEvaluation(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::RewardsEvaluation(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::EmailAlreadyExists(_) => "EMAIL_ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RewardsEvaluation(_) => "REWARDS_ENGINE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::RewardsEvaluation(e) => {
                tracing::warn!(error = %e, "奖励引擎不可用");
                "奖励服务暂不可用，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for OrderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 JSON 序列化错误转换
impl From<serde_json::Error> for OrderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON 处理错误: {}", err))
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, OrderError>;
