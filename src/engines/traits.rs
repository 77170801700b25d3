// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非成功状态码
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    /// 代理配置无效
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
}

/// 抓取请求
///
/// 每次尝试都携带新选取的身份（User-Agent、代理）
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// User-Agent
    pub user_agent: String,
    /// 代理配置 (URL)
    pub proxy: Option<String>,
    /// 附加请求头
    pub headers: Vec<(String, String)>,
    /// 超时时间
    pub timeout: Duration,
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub content: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

impl FetchResponse {
    /// 是否为2xx状态码
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 抓取引擎特质
///
/// 一次调用即一次完整的请求/响应往返，不做重试
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// 执行抓取
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
