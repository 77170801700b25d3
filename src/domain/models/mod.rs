// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 漏洞记录（record）：列表条目和最终写出的记录
/// - 工作单元（work_unit）：（年，月）组合及其URL、文件名规则
pub mod record;
pub mod work_unit;
