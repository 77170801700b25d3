// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 请求节奏限制器
///
/// 每个调用者在请求前独立随机休眠，总请求速率随许可池容量增长。
/// 配置了 `global_rpm` 时，所有调用者另外共享一个令牌桶作为全局上限。
#[derive(Clone)]
pub struct RateLimiter {
    min_delay: Duration,
    max_delay: Duration,
    global: Option<Arc<DefaultDirectRateLimiter>>,
}

impl RateLimiter {
    /// 创建仅随机延迟的限制器
    ///
    /// # 参数
    ///
    /// * `min_delay` - 最小延迟
    /// * `max_delay` - 最大延迟，小于最小值时按最小值处理
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay: max_delay.max(min_delay),
            global: None,
        }
    }

    /// 附加全局每分钟请求数上限
    pub fn with_global_rpm(mut self, rpm: NonZeroU32) -> Self {
        self.global = Some(Arc::new(governor::RateLimiter::direct(Quota::per_minute(rpm))));
        self
    }

    /// 无延迟的限制器
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// 从配置区间中均匀抽取一个延迟
    pub fn next_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::random_range(min..=max))
    }

    /// 阻塞当前任务一段随机时长
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            debug!("Pacing request for {:?}", delay);
            tokio::time::sleep(delay).await;
        }

        if let Some(global) = &self.global {
            global.until_ready().await;
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("global", &self.global.is_some())
            .finish()
    }
}
