// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心实体、提取服务和存储接口
pub mod domain;

/// 引擎模块
///
/// 实现网页抓取引擎、身份轮换和带重试的抓取
pub mod engines;

/// 基础设施模块
///
/// 提供CSV文件存储
pub mod infrastructure;

/// 队列模块
///
/// 实现工作单元调度和并发许可池
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现单个（年，月）的分页抓取
pub mod workers;
