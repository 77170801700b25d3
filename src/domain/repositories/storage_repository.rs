// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::Record;
use crate::domain::models::work_unit::WorkUnit;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV序列化错误
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 持久化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// 记录为空，未写入任何内容
    Skipped,
    /// 已写入文件
    Written { path: PathBuf, rows: usize },
}

/// 记录存储特质
///
/// 接收一个已完成工作单元的全部记录并持久化。
/// 空记录集必须是无操作；已有文件被无条件覆盖。
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// 持久化某个（年，月）的记录
    async fn persist(
        &self,
        unit: WorkUnit,
        records: &[Record],
    ) -> Result<PersistOutcome, StorageError>;
}
