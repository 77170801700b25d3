// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// 并发许可池
///
/// 所有工作单元共享的固定容量许可集合，只承载容量，不承载数据。
/// 每次页面抓取前获取许可，抓取结束后立即释放。
#[derive(Clone, Debug)]
pub struct PermitPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl PermitPool {
    /// 创建许可池
    ///
    /// # 参数
    ///
    /// * `capacity` - 许可数量，至少为1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// 获取一个许可，许可在返回值被丢弃时归还
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.semaphore.acquire().await
    }

    /// 许可池容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前可用许可数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
