// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::ListingEntry;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// 提取错误类型
#[derive(Error, Debug)]
pub enum ExtractError {
    /// 页面结构不符合预期
    #[error("Unexpected markup: {0}")]
    Markup(String),
}

/// 提取器特质
///
/// 给定成功获取的文档，产出零个或多个类型化的值。
/// 提取在同步上下文中完成，`Html` 不会跨越 await 点。
pub trait Extractor: Send + Sync {
    /// 提取结果类型
    type Output: Send;

    /// 从HTML文档中提取数据
    fn extract(&self, html: &str) -> Result<Vec<Self::Output>, ExtractError>;
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static CVE_INFO: Lazy<Selector> = Lazy::new(|| selector(r#"div[data-tsvfield="cveinfo"]"#));
static CVE_ID: Lazy<Selector> = Lazy::new(|| selector(r#"h3[data-tsvfield="cveId"]"#));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static SUMMARY: Lazy<Selector> = Lazy::new(|| selector(r#"div[data-tsvfield="summary"]"#));
static MAX_CVSS: Lazy<Selector> =
    Lazy::new(|| selector(r#"div[data-tsvfield="maxCvssBaseScore"]"#));
static EPSS: Lazy<Selector> = Lazy::new(|| selector(r#"div[data-tsvfield="epssScore"]"#));
static PUBLISHED: Lazy<Selector> = Lazy::new(|| selector(r#"div[data-tsvfield="publishDate"]"#));
static UPDATED: Lazy<Selector> = Lazy::new(|| selector(r#"div[data-tsvfield="updateDate"]"#));
static VULN_CATEGORY: Lazy<Selector> =
    Lazy::new(|| selector("#cve_catslabelsnotes_div span.ssc-vuln-cat"));

/// 取第一个匹配子元素的文本，缺失时为空字符串
fn child_text(element: &ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// 列表页提取器
///
/// 每个 `cveinfo` 片段产出一个 [`ListingEntry`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ListingExtractor;

impl Extractor for ListingExtractor {
    type Output = ListingEntry;

    fn extract(&self, html: &str) -> Result<Vec<ListingEntry>, ExtractError> {
        let document = Html::parse_document(html);

        let entries = document
            .select(&CVE_INFO)
            .map(|fragment| ListingEntry {
                id: child_text(&fragment, &CVE_ID),
                detail_href: fragment
                    .select(&LINK)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::trim)
                    .filter(|href| !href.is_empty())
                    .map(str::to_string),
                summary: child_text(&fragment, &SUMMARY),
                max_severity_score: child_text(&fragment, &MAX_CVSS),
                exploit_probability_score: child_text(&fragment, &EPSS),
                published_at: child_text(&fragment, &PUBLISHED),
                updated_at: child_text(&fragment, &UPDATED),
            })
            .collect();

        Ok(entries)
    }
}

/// 详情页分类提取器
///
/// 至多产出一个分类字符串
#[derive(Debug, Default, Clone, Copy)]
pub struct CategoryExtractor;

impl Extractor for CategoryExtractor {
    type Output = String;

    fn extract(&self, html: &str) -> Result<Vec<String>, ExtractError> {
        let document = Html::parse_document(html);

        Ok(document
            .select(&VULN_CATEGORY)
            .map(|span| span.text().collect::<String>().trim().to_string())
            .find(|text| !text.is_empty())
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
