// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::work_unit::{Month, WorkUnit};
use crate::engines::identity::{IdentityRotator, DEFAULT_USER_AGENTS};
use crate::utils::rate_limiter::RateLimiter;
use crate::utils::retry_policy::RetryPolicy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum SettingsError {
    /// 配置加载失败
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    /// 配置值无效
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 应用程序配置设置
///
/// 启动时加载一次，之后只读共享
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 抓取范围配置
    pub crawl: CrawlSettings,
    /// HTTP配置
    pub http: HttpSettings,
    /// 速率限制配置
    pub rate_limiting: RateLimitingSettings,
    /// 重试配置
    pub retry: RetrySettings,
    /// 并发控制配置
    pub concurrency: ConcurrencySettings,
    /// 存储配置
    pub storage: StorageSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 抓取范围配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 站点根地址
    pub base_url: String,
    /// 年份列表
    pub years: Vec<i32>,
    /// 英文月份名列表
    pub months: Vec<String>,
}

/// HTTP配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 轮换使用的User-Agent
    pub user_agents: Vec<String>,
    /// 轮换使用的代理，可为空
    #[serde(default)]
    pub proxies: Vec<String>,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// Referer请求头
    pub referer: Option<String>,
    /// Accept-Language请求头
    pub accept_language: Option<String>,
}

/// 速率限制配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitingSettings {
    /// 列表页请求前的最小延迟（毫秒）
    pub min_delay_ms: u64,
    /// 列表页请求前的最大延迟（毫秒）
    pub max_delay_ms: u64,
    /// 全局每分钟请求上限，未设置时不启用
    pub global_rpm: Option<u32>,
}

/// 重试配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 固定退避时间（秒）
    pub backoff_secs: u64,
}

/// 并发控制配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ConcurrencySettings {
    /// 页面抓取许可数
    pub permits: usize,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 本地存储路径
    pub local_path: String,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 日志文件路径（追加写入）
    pub file: String,
    /// 默认日志级别，RUST_LOG 优先
    pub level: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/<APP_ENVIRONMENT>` 和
    /// `CVECRAWL__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(SettingsError)` - 配置加载失败
    pub fn new() -> Result<Self, SettingsError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CVECRAWL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("crawl.years")
                    .with_list_parse_key("crawl.months")
                    .with_list_parse_key("http.proxies"),
            );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// 从TOML文本加载配置，未给出的键取默认值
    pub fn from_toml(toml: &str) -> Result<Self, SettingsError> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Ok(builder.build()?.try_deserialize()?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let years: Vec<i64> = (2015..=2025).collect();
        let months: Vec<String> = Month::ALL.iter().map(|m| m.name().to_string()).collect();
        let user_agents: Vec<String> = DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect();

        Config::builder()
            // Default crawl range
            .set_default("crawl.base_url", "https://www.cvedetails.com")?
            .set_default("crawl.years", years)?
            .set_default("crawl.months", months)?
            // Default request shaping
            .set_default("http.user_agents", user_agents)?
            .set_default("http.proxies", Vec::<String>::new())?
            .set_default("http.request_timeout_secs", 30)?
            .set_default("http.referer", "https://www.google.com/")?
            .set_default("http.accept_language", "en-US,en;q=0.9")?
            // Default pacing
            .set_default("rate_limiting.min_delay_ms", 2000)?
            .set_default("rate_limiting.max_delay_ms", 4000)?
            // Default retry settings
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.backoff_secs", 5)?
            // Default concurrency settings
            .set_default("concurrency.permits", 2)?
            // Default storage and logging
            .set_default("storage.local_path", "storage")?
            .set_default("logging.file", "logs/cvecrawl.log")?
            .set_default("logging.level", "info")
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.crawl.years.is_empty() {
            return Err(SettingsError::Invalid("crawl.years must not be empty".into()));
        }
        if self.crawl.months.is_empty() {
            return Err(SettingsError::Invalid("crawl.months must not be empty".into()));
        }
        self.months()?;
        self.base_url()?;

        if self.rate_limiting.min_delay_ms > self.rate_limiting.max_delay_ms {
            return Err(SettingsError::Invalid(format!(
                "rate_limiting.min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.rate_limiting.min_delay_ms, self.rate_limiting.max_delay_ms
            )));
        }
        if self.rate_limiting.global_rpm == Some(0) {
            return Err(SettingsError::Invalid(
                "rate_limiting.global_rpm must be positive".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(SettingsError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.concurrency.permits == 0 {
            return Err(SettingsError::Invalid("concurrency.permits must be at least 1".into()));
        }

        Ok(())
    }

    /// 站点根地址
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        Url::parse(&self.crawl.base_url).map_err(|e| {
            SettingsError::Invalid(format!("crawl.base_url {}: {}", self.crawl.base_url, e))
        })
    }

    /// 解析后的月份列表
    pub fn months(&self) -> Result<Vec<Month>, SettingsError> {
        self.crawl
            .months
            .iter()
            .map(|m| m.parse::<Month>())
            .collect::<Result<_, _>>()
            .map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    /// 年份与月份的笛卡尔积
    pub fn work_units(&self) -> Result<Vec<WorkUnit>, SettingsError> {
        Ok(WorkUnit::cross_product(&self.crawl.years, &self.months()?))
    }

    /// 重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_secs(self.retry.backoff_secs),
        )
    }

    /// 请求节奏限制器
    pub fn rate_limiter(&self) -> RateLimiter {
        let limiter = RateLimiter::new(
            Duration::from_millis(self.rate_limiting.min_delay_ms),
            Duration::from_millis(self.rate_limiting.max_delay_ms),
        );
        match self.rate_limiting.global_rpm.and_then(NonZeroU32::new) {
            Some(rpm) => limiter.with_global_rpm(rpm),
            None => limiter,
        }
    }

    /// 身份轮换器
    pub fn identity_rotator(&self) -> IdentityRotator {
        IdentityRotator::new(self.http.user_agents.clone(), self.http.proxies.clone())
    }

    /// 单次请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    /// 每次请求附带的固定请求头
    pub fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(referer) = &self.http.referer {
            headers.push(("Referer".to_string(), referer.clone()));
        }
        if let Some(lang) = &self.http.accept_language {
            headers.push(("Accept-Language".to_string(), lang.clone()));
        }
        headers
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
