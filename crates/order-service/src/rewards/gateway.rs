//! 奖励引擎 HTTP 网关
//!
//! 通过 RewardsGateway trait 抽象出站调用，便于测试时注入 mock 实现。
//! HTTP 客户端在配置加载完成后显式构造，鉴权头作为默认头附加到每个请求。

use std::time::Instant;

use async_trait::async_trait;
use order_shared::config::RewardsConfig;
use order_shared::observability::metrics;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use tracing::{debug, info, warn};
use validator::Validate;

use super::dto::{
    LoyaltyConfirmRequest, ProfileUpdateRequest, SessionEvaluateRequest, SessionEvaluateResponse,
};
use super::error::{RewardsError, RewardsOperation};

// ---------------------------------------------------------------------------
// Trait 抽象
// ---------------------------------------------------------------------------

/// 奖励引擎接口
///
/// 三个操作都是同步请求/响应，不做重试
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardsGateway: Send + Sync {
    /// 幂等更新用户画像
    async fn upsert_profile(
        &self,
        user_id: i64,
        request: &ProfileUpdateRequest,
    ) -> Result<(), RewardsError>;

    /// 评估会话，返回已校验的折扣与积分结果
    async fn evaluate_session(
        &self,
        request: &SessionEvaluateRequest,
    ) -> Result<SessionEvaluateResponse, RewardsError>;

    /// 确认积分消耗
    async fn confirm_loyalty(
        &self,
        user_id: i64,
        request: &LoyaltyConfirmRequest,
    ) -> Result<(), RewardsError>;
}

// ---------------------------------------------------------------------------
// HTTP 实现
// ---------------------------------------------------------------------------

/// 基于 reqwest 的奖励引擎客户端
///
/// reqwest::Client 内部带连接池，整个进程共享一个实例。
/// 日志只记录方法与路径，请求头和请求体一律不落日志。
pub struct HttpRewardsGateway {
    client: Client,
    base_url: String,
}

impl HttpRewardsGateway {
    /// 根据已加载的配置创建客户端
    pub fn new(config: &RewardsConfig) -> Result<Self, RewardsError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| RewardsError::Config(format!("base_url 无效: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RewardsError::Config(format!(
                "base_url 协议不受支持: {}",
                parsed.scheme()
            )));
        }
        if config.api_key.trim().is_empty() {
            return Err(RewardsError::Config("api_key 未配置".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| RewardsError::Config("api_key 含有非法字符".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| RewardsError::Config(format!("创建 HTTP 客户端失败: {e}")))?;

        info!(
            base_url = %base_url,
            timeout_ms = config.timeout_ms,
            connect_timeout_ms = config.connect_timeout_ms,
            "奖励引擎客户端已初始化"
        );

        Ok(Self { client, base_url })
    }

    /// 发送请求，非 2xx 响应转换为 `RewardsError::Status`
    async fn send<B: Serialize + ?Sized>(
        &self,
        operation: RewardsOperation,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, RewardsError> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| RewardsError::protocol(operation, format!("请求序列化失败: {e}")))?;

        debug!(%operation, %method, path, "调用奖励引擎");

        let response = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .body(payload)
            .send()
            .await
            .map_err(|e| RewardsError::from_reqwest(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RewardsError::status(operation, status, &body));
        }

        Ok(response)
    }
}

/// 记录调用结果指标，失败时输出告警日志
fn observe<T>(
    operation: RewardsOperation,
    started: Instant,
    result: Result<T, RewardsError>,
) -> Result<T, RewardsError> {
    let elapsed = started.elapsed().as_secs_f64();
    match &result {
        Ok(_) => metrics::record_rewards_request(operation.as_str(), "success", elapsed),
        Err(e) => {
            warn!(%operation, outcome = e.outcome_label(), error = %e, "奖励引擎调用失败");
            metrics::record_rewards_request(operation.as_str(), e.outcome_label(), elapsed);
        }
    }
    result
}

#[async_trait]
impl RewardsGateway for HttpRewardsGateway {
    async fn upsert_profile(
        &self,
        user_id: i64,
        request: &ProfileUpdateRequest,
    ) -> Result<(), RewardsError> {
        let operation = RewardsOperation::ProfileUpdate;
        let started = Instant::now();
        let path = format!("/v1/profiles/{}", user_id);

        let result = self
            .send(operation, Method::PUT, &path, request)
            .await
            .map(|_| ());
        observe(operation, started, result)
    }

    async fn evaluate_session(
        &self,
        request: &SessionEvaluateRequest,
    ) -> Result<SessionEvaluateResponse, RewardsError> {
        let operation = RewardsOperation::SessionEvaluate;
        let started = Instant::now();

        let result = async {
            let response = self
                .send(operation, Method::POST, "/v1/sessions", request)
                .await?;
            let parsed: SessionEvaluateResponse = response
                .json()
                .await
                .map_err(|e| RewardsError::from_reqwest(operation, e))?;
            parsed
                .validate()
                .map_err(|e| RewardsError::protocol(operation, e.to_string()))?;
            Ok(parsed)
        }
        .await;
        observe(operation, started, result)
    }

    async fn confirm_loyalty(
        &self,
        user_id: i64,
        request: &LoyaltyConfirmRequest,
    ) -> Result<(), RewardsError> {
        let operation = RewardsOperation::LoyaltyConfirm;
        let started = Instant::now();
        let path = format!("/v1/loyalty/{}/confirm", user_id);

        let result = self
            .send(operation, Method::POST, &path, request)
            .await
            .map(|_| ());
        observe(operation, started, result)
    }
}
