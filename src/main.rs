// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use cvecrawl::config::settings::Settings;
use cvecrawl::engines::reqwest_engine::ReqwestEngine;
use cvecrawl::infrastructure::storage::CsvStorage;
use cvecrawl::queue::scheduler::CrawlScheduler;
use cvecrawl::utils::telemetry;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 加载配置、初始化日志，然后抓取全部（年，月）组合直到结束
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging; a log file we cannot open is fatal
    let _guard = telemetry::init_telemetry(&settings.logging)
        .context("Failed to initialize logging")?;
    info!("Starting cvecrawl...");

    // 3. Assemble components
    let sink = Arc::new(CsvStorage::new(&settings.storage.local_path));
    let scheduler = CrawlScheduler::from_settings(&settings, Arc::new(ReqwestEngine), sink)?;
    info!(
        "Crawling {} units from {}",
        scheduler.units().len(),
        settings.crawl.base_url
    );

    // 4. Run every unit to completion
    let report = scheduler.run().await;
    info!(
        "Done: {} page fetches, {} records, {} files written, {} persistence failures",
        report.total_pages_fetched(),
        report.total_records(),
        report.files_written(),
        report.persist_failures()
    );

    Ok(())
}
