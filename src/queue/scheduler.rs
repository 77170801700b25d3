// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{Settings, SettingsError};
use crate::domain::models::work_unit::WorkUnit;
use crate::domain::repositories::storage_repository::RecordSink;
use crate::engines::fetcher::RetryingFetcher;
use crate::engines::traits::FetchEngine;
use crate::queue::permit_pool::PermitPool;
use crate::workers::month_worker::{MonthWorker, UnitOutcome, UnitReport};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

/// 整次抓取的汇总
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// 各单元报告，顺序与调度顺序一致
    pub units: Vec<UnitReport>,
    /// 任务异常终止的单元
    pub aborted_units: Vec<WorkUnit>,
    /// 总耗时
    pub elapsed: Duration,
}

impl CrawlReport {
    /// 记录总数
    pub fn total_records(&self) -> usize {
        self.units.iter().map(|u| u.records).sum()
    }

    /// 列表页抓取总次数
    pub fn total_pages_fetched(&self) -> u32 {
        self.units.iter().map(|u| u.pages_fetched).sum()
    }

    /// 已写入的文件数
    pub fn files_written(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Written { .. }))
            .count()
    }

    /// 持久化失败的单元数
    pub fn persist_failures(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::PersistFailed(_)))
            .count()
    }
}

/// 工作单元调度器
///
/// 为每个（年，月）立即启动一个任务，并发度只由页面抓取层的许可池限制
pub struct CrawlScheduler {
    worker: Arc<MonthWorker>,
    units: Vec<WorkUnit>,
}

impl CrawlScheduler {
    /// 创建新的调度器实例
    ///
    /// # 参数
    ///
    /// * `worker` - 所有单元共享的月度工作器
    /// * `units` - 待处理的工作单元
    pub fn new(worker: Arc<MonthWorker>, units: Vec<WorkUnit>) -> Self {
        Self { worker, units }
    }

    /// 根据配置组装调度器
    ///
    /// # 参数
    ///
    /// * `settings` - 已加载的配置
    /// * `engine` - 抓取引擎
    /// * `sink` - 记录存储
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlScheduler)` - 组装完成的调度器
    /// * `Err(SettingsError)` - 配置无效
    pub fn from_settings(
        settings: &Settings,
        engine: Arc<dyn FetchEngine>,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;

        let fetcher = RetryingFetcher::new(
            engine,
            settings.identity_rotator(),
            settings.retry_policy(),
        )
        .with_timeout(settings.request_timeout())
        .with_headers(settings.request_headers());

        let worker = MonthWorker::new(
            settings.base_url()?,
            fetcher,
            settings.rate_limiter(),
            PermitPool::new(settings.concurrency.permits),
            sink,
        );

        Ok(Self::new(Arc::new(worker), settings.work_units()?))
    }

    /// 待处理的工作单元
    pub fn units(&self) -> &[WorkUnit] {
        &self.units
    }

    /// 运行全部工作单元并等待结束
    ///
    /// 单元之间互不影响；某个任务异常终止只会记录在报告中
    pub async fn run(&self) -> CrawlReport {
        let start = Instant::now();
        info!(
            "Scheduling {} units with {} page permits",
            self.units.len(),
            self.worker.permits().capacity()
        );

        let handles: Vec<_> = self
            .units
            .iter()
            .map(|&unit| {
                let worker = self.worker.clone();
                tokio::spawn(async move { worker.run(unit).await })
            })
            .collect();

        let results = join_all(handles).await;

        let mut report = CrawlReport::default();
        for (unit, result) in self.units.iter().zip(results) {
            match result {
                Ok(unit_report) => report.units.push(unit_report),
                Err(e) => {
                    error!("Task for {} terminated abnormally: {}", unit, e);
                    report.aborted_units.push(*unit);
                }
            }
        }

        report.elapsed = start.elapsed();
        info!(
            "Total time needed: {:?} ({} records, {} files)",
            report.elapsed,
            report.total_records(),
            report.files_written()
        );

        report
    }
}
