// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：漏洞记录和工作单元
/// - 仓库接口（repositories）：记录存储的抽象接口
/// - 服务（services）：列表页和详情页的字段提取
pub mod models;
pub mod repositories;
pub mod services;
