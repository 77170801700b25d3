// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// 固定退避：每次重试前等待相同时长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 退避时间
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// 创建重试策略
    ///
    /// # 参数
    ///
    /// * `max_attempts` - 最大尝试次数，至少为1
    /// * `backoff` - 两次尝试之间的等待时间
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// 计算第 `attempt` 次失败后的退避时间
    ///
    /// 与尝试次数无关，始终返回固定值
    pub fn calculate_backoff(&self, _attempt: u32) -> Duration {
        self.backoff
    }

    /// 第 `attempt` 次尝试失败后是否还应重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
