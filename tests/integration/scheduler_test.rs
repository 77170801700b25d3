// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{listing_page, listing_url, worker, MockSite, Reply};
use async_trait::async_trait;
use cvecrawl::domain::models::record::Record;
use cvecrawl::domain::models::work_unit::{Month, WorkUnit};
use cvecrawl::domain::repositories::storage_repository::{
    PersistOutcome, RecordSink, StorageError,
};
use cvecrawl::infrastructure::storage::InMemoryRecordSink;
use cvecrawl::queue::scheduler::CrawlScheduler;
use cvecrawl::workers::UnitOutcome;
use std::sync::Arc;
use std::time::Duration;

/// 对指定单元写入失败的存储
struct FailingSink {
    failing: WorkUnit,
    inner: InMemoryRecordSink,
}

#[async_trait]
impl RecordSink for FailingSink {
    async fn persist(
        &self,
        unit: WorkUnit,
        records: &[Record],
    ) -> Result<PersistOutcome, StorageError> {
        if unit == self.failing {
            return Err(StorageError::Other("disk full".to_string()));
        }
        self.inner.persist(unit, records).await
    }
}

/// 每个单元两页数据加一个空页
fn busy_site(units: &[WorkUnit]) -> MockSite {
    let mut site = MockSite::new().with_latency(Duration::from_millis(20));
    for unit in units {
        let name = unit.month.name();
        let number = unit.month.number();
        for page in 1..=2 {
            let ids: Vec<String> = (0..3)
                .map(|i| format!("CVE-{}-{:02}{}{}", unit.year, number, page, i))
                .collect();
            let entries: Vec<(&str, bool)> = ids.iter().map(|id| (id.as_str(), false)).collect();
            site = site.page(
                listing_url(unit.year, number, name, page),
                listing_page(&entries),
            );
        }
    }
    site
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_fetches_never_exceed_permits() {
    for permits in [1, 2, 3] {
        let units = WorkUnit::cross_product(&[2023, 2024], &Month::ALL);
        let site = Arc::new(busy_site(&units));
        let sink = Arc::new(InMemoryRecordSink::new());
        let scheduler = CrawlScheduler::new(
            Arc::new(worker(site.clone(), sink.clone(), permits)),
            units.clone(),
        );

        let report = scheduler.run().await;

        assert_eq!(site.max_in_flight(), permits);
        assert_eq!(report.units.len(), units.len());
        assert!(report.aborted_units.is_empty());
        assert_eq!(report.total_pages_fetched(), 3 * units.len() as u32);
        assert_eq!(report.total_records(), 6 * units.len());
        assert_eq!(sink.len().await, units.len());
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_unit_does_not_affect_others() {
    let broken = WorkUnit::new(2024, Month::January);
    let healthy = WorkUnit::new(2024, Month::February);
    let site = Arc::new(
        MockSite::new()
            .route(listing_url(2024, 1, "January", 1), vec![Reply::Status(500)])
            .page(
                listing_url(2024, 2, "February", 1),
                listing_page(&[("CVE-2024-1000", false)]),
            ),
    );
    let sink = Arc::new(InMemoryRecordSink::new());
    let scheduler = CrawlScheduler::new(
        Arc::new(worker(site.clone(), sink.clone(), 2)),
        vec![broken, healthy],
    );

    let report = scheduler.run().await;

    assert_eq!(report.units.len(), 2);
    assert_eq!(report.units[0].unit, broken);
    assert_eq!(report.units[0].outcome, UnitOutcome::Empty);
    assert_eq!(report.units[1].unit, healthy);
    assert!(matches!(
        report.units[1].outcome,
        UnitOutcome::Written { rows: 1, .. }
    ));
    assert_eq!(report.files_written(), 1);
    assert!(sink.records(broken).await.is_none());
    assert_eq!(sink.records(healthy).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_unit_reaches_the_sink() {
    let units = WorkUnit::cross_product(&[2015, 2016], &[Month::June]);
    let site = Arc::new(MockSite::new());
    let sink = Arc::new(InMemoryRecordSink::new());
    let scheduler = CrawlScheduler::new(
        Arc::new(worker(site.clone(), sink.clone(), 2)),
        units.clone(),
    );

    let report = scheduler.run().await;

    // Empty months still get a persist call, which writes nothing
    assert_eq!(sink.calls().await.len(), 2);
    assert!(sink.is_empty().await);
    assert_eq!(report.files_written(), 0);
    assert_eq!(scheduler.units(), units.as_slice());
}

#[tokio::test(start_paused = true)]
async fn test_backoff_does_not_hold_a_permit() {
    let january = listing_url(2024, 1, "January", 1);
    let february = listing_url(2024, 2, "February", 1);
    let site = Arc::new(
        MockSite::new()
            .route(january.clone(), vec![Reply::Status(500)])
            .page(february.clone(), listing_page(&[("CVE-2024-2000", false)])),
    );
    let sink = Arc::new(InMemoryRecordSink::new());
    let scheduler = CrawlScheduler::new(
        Arc::new(worker(site.clone(), sink.clone(), 1)),
        vec![
            WorkUnit::new(2024, Month::January),
            WorkUnit::new(2024, Month::February),
        ],
    );

    scheduler.run().await;

    let urls: Vec<String> = site.requests().into_iter().map(|r| r.url).collect();
    let january_attempts: Vec<usize> = urls
        .iter()
        .enumerate()
        .filter(|(_, url)| **url == january)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(january_attempts.len(), 3);

    // February finishes while January waits out its first backoff
    let february_pages: Vec<usize> = urls
        .iter()
        .enumerate()
        .filter(|(_, url)| url.contains("/month-02/"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(february_pages.len(), 2);
    assert!(february_pages.iter().all(|&i| i < january_attempts[1]));
    assert_eq!(sink.records(WorkUnit::new(2024, Month::February)).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_persist_failure_is_isolated_to_its_unit() {
    let broken = WorkUnit::new(2024, Month::January);
    let healthy = WorkUnit::new(2024, Month::February);
    let site = Arc::new(
        MockSite::new()
            .page(
                listing_url(2024, 1, "January", 1),
                listing_page(&[("CVE-2024-3000", false)]),
            )
            .page(
                listing_url(2024, 2, "February", 1),
                listing_page(&[("CVE-2024-3001", false)]),
            ),
    );
    let sink = Arc::new(FailingSink {
        failing: broken,
        inner: InMemoryRecordSink::new(),
    });
    let scheduler = CrawlScheduler::new(
        Arc::new(worker(site.clone(), sink.clone(), 2)),
        vec![broken, healthy],
    );

    let report = scheduler.run().await;

    assert!(matches!(
        &report.units[0].outcome,
        UnitOutcome::PersistFailed(reason) if reason.contains("disk full")
    ));
    assert_eq!(report.units[0].records, 1);
    assert!(matches!(
        report.units[1].outcome,
        UnitOutcome::Written { rows: 1, .. }
    ));
    assert_eq!(report.persist_failures(), 1);
    assert_eq!(report.files_written(), 1);
    assert!(sink.inner.records(broken).await.is_none());
    assert_eq!(sink.inner.records(healthy).await.unwrap().len(), 1);
}
