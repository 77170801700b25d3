// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{detail_page, detail_url, listing_page, listing_url, worker, MockSite, Reply};
use cvecrawl::domain::models::work_unit::{Month, WorkUnit};
use cvecrawl::infrastructure::storage::InMemoryRecordSink;
use cvecrawl::workers::UnitOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn march_2024() -> WorkUnit {
    WorkUnit::new(2024, Month::March)
}

#[tokio::test(start_paused = true)]
async fn test_two_records_then_empty_page() {
    let site = Arc::new(
        MockSite::new()
            .page(
                listing_url(2024, 3, "March", 1),
                listing_page(&[("CVE-2024-0001", true), ("CVE-2024-0002", true)]),
            )
            .page(listing_url(2024, 3, "March", 2), listing_page(&[]))
            .page(detail_url("CVE-2024-0001"), detail_page(Some("SQL Injection")))
            .page(detail_url("CVE-2024-0002"), detail_page(None)),
    );
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    let report = worker.run(march_2024()).await;

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.records, 2);
    assert_eq!(report.unresolved_categories, 1);
    assert!(matches!(report.outcome, UnitOutcome::Written { rows: 2, .. }));

    let records = sink.records(march_2024()).await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    let categories: Vec<_> = records.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(ids, vec!["CVE-2024-0001", "CVE-2024-0002"]);
    assert_eq!(categories, vec!["SQL Injection", "N/A"]);
    assert_eq!(records[0].summary, "Summary of CVE-2024-0001");
    assert_eq!(records[0].max_severity_score, "7.5");

    assert_eq!(site.hits(&listing_url(2024, 3, "March", 3)), 0);
    assert_eq!(site.hits(&detail_url("CVE-2024-0001")), 1);
    assert_eq!(site.hits(&detail_url("CVE-2024-0002")), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetches_every_page_up_to_first_empty_one() {
    let site = Arc::new(
        MockSite::new()
            .page(listing_url(2024, 3, "March", 1), listing_page(&[("CVE-A", false)]))
            .page(listing_url(2024, 3, "March", 2), listing_page(&[("CVE-B", false)]))
            .page(listing_url(2024, 3, "March", 3), listing_page(&[("CVE-C", false)])),
    );
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    let report = worker.run(march_2024()).await;

    // Pages 1-3 carry records, page 4 is the empty terminator
    assert_eq!(report.pages_fetched, 4);
    assert_eq!(report.records, 3);
    for page in 1..=4 {
        assert_eq!(site.hits(&listing_url(2024, 3, "March", page)), 1);
    }
    assert_eq!(site.hits(&listing_url(2024, 3, "March", 5)), 0);
}

#[tokio::test(start_paused = true)]
async fn test_entry_without_link_skips_detail_fetch() {
    let site = Arc::new(MockSite::new().page(
        listing_url(2024, 3, "March", 1),
        listing_page(&[("CVE-2024-0003", false)]),
    ));
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    let report = worker.run(march_2024()).await;

    assert_eq!(report.records, 1);
    let records = sink.records(march_2024()).await.unwrap();
    assert_eq!(records[0].category, "N/A");
    assert!(site.requests().iter().all(|r| !r.url.contains("/cve/")));
}

#[tokio::test(start_paused = true)]
async fn test_detail_failure_keeps_record_as_unavailable() {
    let site = Arc::new(
        MockSite::new()
            .page(
                listing_url(2024, 3, "March", 1),
                listing_page(&[("CVE-2024-0004", true), ("CVE-2024-0005", true)]),
            )
            .route(detail_url("CVE-2024-0004"), vec![Reply::Status(500)])
            .page(detail_url("CVE-2024-0005"), detail_page(Some("XSS"))),
    );
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    let start = Instant::now();
    let report = worker.run(march_2024()).await;

    assert_eq!(site.hits(&detail_url("CVE-2024-0004")), 3);
    // Two fixed 5s backoffs between the three detail attempts
    assert!(start.elapsed() >= Duration::from_secs(10));

    let records = sink.records(march_2024()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].category, "N/A");
    assert_eq!(records[1].category, "XSS");
    assert_eq!(report.unresolved_categories, 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_listing_failure_is_retried() {
    let site = Arc::new(MockSite::new().route(
        listing_url(2024, 3, "March", 1),
        vec![
            Reply::Timeout,
            Reply::Page(listing_page(&[("CVE-2024-0006", false)])),
        ],
    ));
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    let report = worker.run(march_2024()).await;

    assert_eq!(site.hits(&listing_url(2024, 3, "March", 1)), 2);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.records, 1);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_first_page_writes_nothing() {
    let site = Arc::new(
        MockSite::new().route(listing_url(2024, 3, "March", 1), vec![Reply::Status(503)]),
    );
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    let report = worker.run(march_2024()).await;

    assert_eq!(site.hits(&listing_url(2024, 3, "March", 1)), 3);
    assert_eq!(site.hits(&listing_url(2024, 3, "March", 2)), 0);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.outcome, UnitOutcome::Empty);
    assert!(sink.records(march_2024()).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_later_page_keeps_earlier_records() {
    let site = Arc::new(
        MockSite::new()
            .page(
                listing_url(2024, 3, "March", 1),
                listing_page(&[("CVE-2024-0007", false), ("CVE-2024-0008", false)]),
            )
            .route(listing_url(2024, 3, "March", 2), vec![Reply::Timeout]),
    );
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    let report = worker.run(march_2024()).await;

    assert_eq!(site.hits(&listing_url(2024, 3, "March", 2)), 3);
    assert_eq!(site.hits(&listing_url(2024, 3, "March", 3)), 0);
    assert_eq!(report.records, 2);
    assert_eq!(sink.records(march_2024()).await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_requests_carry_rotated_identity() {
    let site = Arc::new(MockSite::new());
    let sink = Arc::new(InMemoryRecordSink::new());
    let worker = worker(site.clone(), sink.clone(), 2);

    worker.run(march_2024()).await;

    let requests = site.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].user_agent.is_empty());
    assert_eq!(requests[0].proxy, None);
}
