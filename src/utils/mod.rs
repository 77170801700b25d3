// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供重试策略、请求节奏控制、日志初始化等通用功能
pub mod errors;
pub mod rate_limiter;
pub mod retry_policy;
pub mod telemetry;
