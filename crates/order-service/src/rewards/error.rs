//! 奖励引擎网关错误
//!
//! 传输失败、超时、非 2xx 响应、响应格式非法统一归到 `RewardsError`，
//! 每个变体都带上出错的操作，便于日志与指标按操作聚合。

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// 上游响应体最多保留的字节数
const MAX_UPSTREAM_BODY: usize = 2048;

/// 奖励引擎操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardsOperation {
    ProfileUpdate,
    SessionEvaluate,
    LoyaltyConfirm,
}

impl RewardsOperation {
    /// 指标与日志中使用的标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileUpdate => "profile_update",
            Self::SessionEvaluate => "session_evaluate",
            Self::LoyaltyConfirm => "loyalty_confirm",
        }
    }
}

impl fmt::Display for RewardsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 奖励引擎错误
///
/// `Status` 中的 `body` 仅供排查使用，不参与 Display 输出，
/// 避免上游返回的个人信息进入日志或 API 响应。
#[derive(Debug, Error)]
pub enum RewardsError {
    #[error("奖励引擎配置无效: {0}")]
    Config(String),

    #[error("奖励引擎请求失败 [{operation}]: {message}")]
    Transport {
        operation: RewardsOperation,
        message: String,
    },

    #[error("奖励引擎请求超时 [{operation}]")]
    Timeout { operation: RewardsOperation },

    #[error("奖励引擎返回错误状态 [{operation}]: {status}")]
    Status {
        operation: RewardsOperation,
        status: StatusCode,
        body: String,
    },

    #[error("奖励引擎响应格式无效 [{operation}]: {message}")]
    Protocol {
        operation: RewardsOperation,
        message: String,
    },
}

impl RewardsError {
    /// 从 reqwest 错误转换，区分超时与其他传输错误
    pub fn from_reqwest(operation: RewardsOperation, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation }
        } else if err.is_decode() {
            Self::Protocol {
                operation,
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                operation,
                // 不携带 URL，避免把路径中的用户标识写进错误信息
                message: err.without_url().to_string(),
            }
        }
    }

    /// 非 2xx 响应
    pub fn status(operation: RewardsOperation, status: StatusCode, body: &str) -> Self {
        Self::Status {
            operation,
            status,
            body: truncate_body(body),
        }
    }

    pub fn protocol(operation: RewardsOperation, message: impl Into<String>) -> Self {
        Self::Protocol {
            operation,
            message: message.into(),
        }
    }

    /// 出错的操作（配置错误没有对应操作）
    pub fn operation(&self) -> Option<RewardsOperation> {
        match self {
            Self::Config(_) => None,
            Self::Transport { operation, .. }
            | Self::Timeout { operation }
            | Self::Status { operation, .. }
            | Self::Protocol { operation, .. } => Some(*operation),
        }
    }

    /// 上游 HTTP 状态码（如有）
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 上游响应体（如有，已截断）
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// 指标标签
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::Protocol { .. } => "protocol",
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_UPSTREAM_BODY {
        return body.to_string();
    }
    let mut end = MAX_UPSTREAM_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_hides_body_in_display() {
        let err = RewardsError::status(
            RewardsOperation::SessionEvaluate,
            StatusCode::BAD_REQUEST,
            r#"{"email":"alice@example.com"}"#,
        );
        let text = err.to_string();
        assert!(text.contains("session_evaluate"));
        assert!(text.contains("400"));
        assert!(!text.contains("alice@example.com"));
        assert_eq!(err.upstream_status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.upstream_body(), Some(r#"{"email":"alice@example.com"}"#));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "界".repeat(1000);
        let err = RewardsError::status(
            RewardsOperation::LoyaltyConfirm,
            StatusCode::INTERNAL_SERVER_ERROR,
            &body,
        );
        let kept = err.upstream_body().unwrap();
        assert!(kept.len() <= MAX_UPSTREAM_BODY + 3);
        assert!(kept.ends_with("..."));
    }

    #[test]
    fn test_operation_and_labels() {
        let err = RewardsError::Timeout {
            operation: RewardsOperation::ProfileUpdate,
        };
        assert!(err.is_timeout());
        assert_eq!(err.operation(), Some(RewardsOperation::ProfileUpdate));
        assert_eq!(err.outcome_label(), "timeout");

        let err = RewardsError::Config("base_url 为空".into());
        assert_eq!(err.operation(), None);
        assert_eq!(err.outcome_label(), "config");
    }
}
