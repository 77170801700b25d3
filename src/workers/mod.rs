// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 每个工作单元的分页抓取循环
pub mod month_worker;

pub use month_worker::{MonthWorker, UnitOutcome, UnitReport};
