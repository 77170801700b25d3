// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 负责工作单元的调度和页面抓取的并发许可
pub mod permit_pool;
pub mod scheduler;
