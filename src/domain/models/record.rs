// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 分类不可用时的占位值
pub const CATEGORY_UNAVAILABLE: &str = "N/A";

/// 列表页中的单个漏洞条目
///
/// 由列表页HTML片段直接提取，尚未解析分类字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// 漏洞编号
    pub id: String,
    /// 详情页相对链接
    pub detail_href: Option<String>,
    /// 描述
    pub summary: String,
    /// 最高CVSS分数
    pub max_severity_score: String,
    /// EPSS分数
    pub exploit_probability_score: String,
    /// 发布日期
    pub published_at: String,
    /// 更新日期
    pub updated_at: String,
}

/// 漏洞记录实体
///
/// 由一个列表条目加上它触发的详情抓取构成，构建后不再修改。
/// 字段顺序即CSV列顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "CVE ID")]
    pub id: String,
    #[serde(rename = "CVE Type")]
    pub category: String,
    #[serde(rename = "Description")]
    pub summary: String,
    #[serde(rename = "Max CVSS")]
    pub max_severity_score: String,
    #[serde(rename = "EPSS Score")]
    pub exploit_probability_score: String,
    #[serde(rename = "Published")]
    pub published_at: String,
    #[serde(rename = "Updated")]
    pub updated_at: String,
}

impl Record {
    /// CSV表头，与字段顺序一致
    pub const HEADER: [&'static str; 7] = [
        "CVE ID",
        "CVE Type",
        "Description",
        "Max CVSS",
        "EPSS Score",
        "Published",
        "Updated",
    ];

    /// 由列表条目和已解析的分类构建记录
    ///
    /// # 参数
    ///
    /// * `entry` - 列表页条目
    /// * `category` - 分类，详情抓取失败时为 `N/A`
    pub fn from_listing(entry: ListingEntry, category: impl Into<String>) -> Self {
        Self {
            id: entry.id,
            category: category.into(),
            summary: entry.summary,
            max_severity_score: entry.max_severity_score,
            exploit_probability_score: entry.exploit_probability_score,
            published_at: entry.published_at,
            updated_at: entry.updated_at,
        }
    }

    /// 分类是否为占位值
    pub fn category_unavailable(&self) -> bool {
        self.category == CATEGORY_UNAVAILABLE
    }
}
