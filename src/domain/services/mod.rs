// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 提取服务（extraction_service）：从HTML中提取列表条目和漏洞分类
pub mod extraction_service;
