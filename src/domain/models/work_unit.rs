// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 月份解析错误
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown month name: {0}")]
pub struct UnknownMonth(pub String);

/// 日历月份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// 全部十二个月，按日历顺序
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// 月份序号（1-12）
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// 英文月份名
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = UnknownMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

/// 工作单元
///
/// 一个（年，月）组合，由处理它的任务独占
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkUnit {
    pub year: i32,
    pub month: Month,
}

impl WorkUnit {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// 生成年份与月份的笛卡尔积
    ///
    /// # 参数
    ///
    /// * `years` - 年份列表
    /// * `months` - 月份列表
    ///
    /// # 返回值
    ///
    /// 按年份优先顺序排列的工作单元列表
    pub fn cross_product(years: &[i32], months: &[Month]) -> Vec<WorkUnit> {
        years
            .iter()
            .flat_map(|&year| months.iter().map(move |&month| WorkUnit::new(year, month)))
            .collect()
    }

    /// 构建列表页URL
    ///
    /// 形如 `<base>/vulnerability-list/year-YYYY/month-MM/MonthName.html?page=N&order=1`
    pub fn listing_url(&self, base_url: &str, page: u32) -> String {
        format!(
            "{}/vulnerability-list/year-{}/month-{:02}/{}.html?page={}&order=1",
            base_url.trim_end_matches('/'),
            self.year,
            self.month.number(),
            self.month.name(),
            page
        )
    }

    /// 输出文件名，形如 `CVE_2024_March.csv`
    pub fn file_name(&self) -> String {
        format!("CVE_{}_{}.csv", self.year, self.month.name())
    }
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}
