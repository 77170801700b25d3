// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{ListingEntry, Record, CATEGORY_UNAVAILABLE};
use crate::domain::models::work_unit::WorkUnit;
use crate::domain::repositories::storage_repository::{PersistOutcome, RecordSink};
use crate::domain::services::extraction_service::{CategoryExtractor, ListingExtractor};
use crate::engines::fetcher::RetryingFetcher;
use crate::queue::permit_pool::PermitPool;
use crate::utils::errors::WorkerError;
use crate::utils::rate_limiter::RateLimiter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// 单元的最终落盘结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// 已写入文件
    Written { path: PathBuf, rows: usize },
    /// 没有任何记录，未写文件
    Empty,
    /// 持久化失败，未留下文件
    PersistFailed(String),
}

/// 单元执行报告
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub unit: WorkUnit,
    /// 发出的列表页抓取次数，包含终止分页的那一页
    pub pages_fetched: u32,
    /// 收集到的记录数
    pub records: usize,
    /// 分类回退为 `N/A` 的记录数
    pub unresolved_categories: usize,
    pub outcome: UnitOutcome,
}

/// 月度抓取工作器
///
/// 对一个（年，月）逐页抓取列表，直到某页为空或重试耗尽；
/// 每条记录额外抓取详情页解析分类，最后一次性交给存储。
pub struct MonthWorker {
    base_url: Url,
    fetcher: RetryingFetcher,
    rate_limiter: RateLimiter,
    permits: PermitPool,
    sink: Arc<dyn RecordSink>,
}

impl MonthWorker {
    /// 创建月度抓取工作器
    ///
    /// # 参数
    ///
    /// * `base_url` - 站点根地址
    /// * `fetcher` - 带重试的抓取器
    /// * `rate_limiter` - 列表页请求前的节奏限制
    /// * `permits` - 所有单元共享的许可池，每次请求往返占用一个许可
    /// * `sink` - 记录存储
    pub fn new(
        base_url: Url,
        fetcher: RetryingFetcher,
        rate_limiter: RateLimiter,
        permits: PermitPool,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            base_url,
            fetcher: fetcher.with_permits(permits.clone()),
            rate_limiter,
            permits,
            sink,
        }
    }

    /// 共享的许可池
    pub fn permits(&self) -> &PermitPool {
        &self.permits
    }

    /// 处理一个工作单元
    ///
    /// 失败不会向外传播：列表页重试耗尽视为分页结束，
    /// 详情页失败回退为 `N/A`，存储失败记录日志后放弃。
    #[instrument(skip_all, fields(unit = %unit))]
    pub async fn run(&self, unit: WorkUnit) -> UnitReport {
        let mut page = 1;
        let mut pages_fetched = 0;
        let mut records: Vec<Record> = Vec::new();

        loop {
            self.rate_limiter.wait().await;

            let url = unit.listing_url(self.base_url.as_str(), page);
            let result = self.fetcher.fetch(&url, &ListingExtractor).await;
            pages_fetched += 1;

            let entries = match result {
                Ok(entries) if entries.is_empty() => {
                    info!("No more records on {}, stopping at page {}", unit, page);
                    break;
                }
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ending {} at page {}: {}", unit, page, e);
                    break;
                }
            };

            debug!("Page {} of {} yielded {} entries", page, unit, entries.len());
            for entry in entries {
                let category = self.resolve_category(&entry).await;
                records.push(Record::from_listing(entry, category));
            }

            page += 1;
        }

        let unresolved_categories = records.iter().filter(|r| r.category_unavailable()).count();
        let outcome = self.flush(unit, &records).await;

        info!(
            "Finished {}: {} records from {} page fetches",
            unit,
            records.len(),
            pages_fetched
        );

        UnitReport {
            unit,
            pages_fetched,
            records: records.len(),
            unresolved_categories,
            outcome,
        }
    }

    async fn resolve_category(&self, entry: &ListingEntry) -> String {
        let Some(href) = entry.detail_href.as_deref() else {
            debug!("{} has no detail link", entry.id);
            return CATEGORY_UNAVAILABLE.to_string();
        };

        match self.detail_category(href).await {
            Ok(Some(category)) => category,
            Ok(None) => CATEGORY_UNAVAILABLE.to_string(),
            Err(e) => {
                warn!("Category unavailable for {}: {}", entry.id, e);
                CATEGORY_UNAVAILABLE.to_string()
            }
        }
    }

    async fn detail_category(&self, href: &str) -> Result<Option<String>, WorkerError> {
        let url = detail_url(&self.base_url, href).map_err(|source| WorkerError::InvalidLink {
            href: href.to_string(),
            source,
        })?;

        let categories = self.fetcher.fetch(url.as_str(), &CategoryExtractor).await?;
        Ok(categories.into_iter().next())
    }

    async fn flush(&self, unit: WorkUnit, records: &[Record]) -> UnitOutcome {
        match self.sink.persist(unit, records).await {
            Ok(PersistOutcome::Written { path, rows }) => {
                info!("Exported: {}", path.display());
                UnitOutcome::Written { path, rows }
            }
            Ok(PersistOutcome::Skipped) => UnitOutcome::Empty,
            Err(e) => {
                error!("Failed to persist {}: {}", unit, e);
                UnitOutcome::PersistFailed(e.to_string())
            }
        }
    }
}

/// 详情页地址：站点根地址拼接列表页中的链接
///
/// 以 `/` 开头的链接接在根地址的路径之后，其余链接按URL规则解析
fn detail_url(base_url: &Url, href: &str) -> Result<Url, url::ParseError> {
    if href.starts_with('/') && !href.starts_with("//") {
        Url::parse(&format!("{}{}", base_url.as_str().trim_end_matches('/'), href))
    } else {
        base_url.join(href)
    }
}
