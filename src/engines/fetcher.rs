// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::extraction_service::{ExtractError, Extractor};
use crate::engines::identity::IdentityRotator;
use crate::engines::traits::{EngineError, FetchEngine, FetchRequest};
use crate::queue::permit_pool::PermitPool;
use crate::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// 单次尝试的错误
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Permit pool closed")]
    PermitPoolClosed(#[from] tokio::sync::AcquireError),
}

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 重试次数耗尽
    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: AttemptError,
    },
}

/// 带重试的抓取器
///
/// 每次尝试都重新选取出站身份；任何传输、状态码或提取失败都会在固定退避后重试。
/// 成功时即使提取结果为空也直接返回，是否代表分页结束由调用方判断。
/// 配置了许可池时，许可只覆盖单次请求往返，退避等待期间不占用许可。
#[derive(Clone)]
pub struct RetryingFetcher {
    engine: Arc<dyn FetchEngine>,
    identities: IdentityRotator,
    policy: RetryPolicy,
    timeout: Duration,
    headers: Vec<(String, String)>,
    permits: Option<PermitPool>,
}

impl RetryingFetcher {
    /// 创建抓取器
    ///
    /// # 参数
    ///
    /// * `engine` - 底层抓取引擎
    /// * `identities` - 身份轮换器
    /// * `policy` - 重试策略
    pub fn new(
        engine: Arc<dyn FetchEngine>,
        identities: IdentityRotator,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            engine,
            identities,
            policy,
            timeout: Duration::from_secs(30),
            headers: Vec::new(),
            permits: None,
        }
    }

    /// 设置单次请求超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 设置每次请求附带的固定请求头
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// 设置共享许可池，每次请求往返前获取一个许可
    pub fn with_permits(mut self, permits: PermitPool) -> Self {
        self.permits = Some(permits);
        self
    }

    /// 当前重试策略
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// 抓取URL并用提取器解析
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `extractor` - 提取器
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<_>)` - 首次成功尝试的提取结果，可能为空
    /// * `Err(FetchError)` - 所有尝试均失败
    pub async fn fetch<X>(&self, url: &str, extractor: &X) -> Result<Vec<X::Output>, FetchError>
    where
        X: Extractor,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(url, extractor).await {
                Ok(values) => return Ok(values),
                Err(e) if self.policy.should_retry(attempt) => {
                    let backoff = self.policy.calculate_backoff(attempt);
                    warn!(
                        "Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                        attempt, self.policy.max_attempts, url, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    warn!("Giving up on {} after {} attempts: {}", url, attempt, e);
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last_error: e,
                    });
                }
            }
        }
    }

    async fn attempt<X>(&self, url: &str, extractor: &X) -> Result<Vec<X::Output>, AttemptError>
    where
        X: Extractor,
    {
        let identity = self.identities.pick_identity();
        let request = FetchRequest {
            url: url.to_string(),
            user_agent: identity.user_agent,
            proxy: identity.proxy,
            headers: self.headers.clone(),
            timeout: self.timeout,
        };

        let response = {
            let _permit = match &self.permits {
                Some(pool) => Some(pool.acquire().await?),
                None => None,
            };
            info!("Fetching {}", url);
            self.engine.fetch(&request).await?
        };
        if !response.is_success() {
            return Err(EngineError::Status(response.status_code).into());
        }

        Ok(extractor.extract(&response.content)?)
    }
}
