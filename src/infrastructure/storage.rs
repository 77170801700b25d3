// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::domain::models::record::Record;
use crate::domain::models::work_unit::WorkUnit;
use crate::domain::repositories::storage_repository::{PersistOutcome, RecordSink, StorageError};

/// 将记录编码为带表头的CSV字节
pub fn encode_csv(records: &[Record]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        writer.write_record(Record::HEADER)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))
}

/// 本地CSV存储实现
///
/// 文件位于 `<base>/<year>/CVE_<year>_<Month>.csv`
pub struct CsvStorage {
    base_path: PathBuf,
}

impl CsvStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// 某个工作单元的目标文件路径
    pub fn path_for(&self, unit: WorkUnit) -> PathBuf {
        self.base_path
            .join(unit.year.to_string())
            .join(unit.file_name())
    }

    async fn write_replacing(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::Other(format!("No parent for {}", path.display())))?;

        // 确保目录存在
        fs::create_dir_all(parent).await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let tmp_path = parent.join(format!(".{}.tmp", file_name));

        let written = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(data).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(e));
        }

        Ok(())
    }
}

#[async_trait]
impl RecordSink for CsvStorage {
    async fn persist(
        &self,
        unit: WorkUnit,
        records: &[Record],
    ) -> Result<PersistOutcome, StorageError> {
        if records.is_empty() {
            return Ok(PersistOutcome::Skipped);
        }

        let data = encode_csv(records)?;
        let path = self.path_for(unit);
        self.write_replacing(&path, &data).await?;

        Ok(PersistOutcome::Written {
            path,
            rows: records.len(),
        })
    }
}

/// 测试用的内存存储实现
#[derive(Clone, Default)]
pub struct InMemoryRecordSink {
    data: Arc<RwLock<HashMap<WorkUnit, Vec<Record>>>>,
    calls: Arc<RwLock<Vec<WorkUnit>>>,
}

impl InMemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某个单元最后一次写入的记录
    pub async fn records(&self, unit: WorkUnit) -> Option<Vec<Record>> {
        self.data.read().await.get(&unit).cloned()
    }

    /// 所有 persist 调用（含空记录）
    pub async fn calls(&self) -> Vec<WorkUnit> {
        self.calls.read().await.clone()
    }

    /// 已写入的单元数
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl RecordSink for InMemoryRecordSink {
    async fn persist(
        &self,
        unit: WorkUnit,
        records: &[Record],
    ) -> Result<PersistOutcome, StorageError> {
        self.calls.write().await.push(unit);
        if records.is_empty() {
            return Ok(PersistOutcome::Skipped);
        }

        self.data.write().await.insert(unit, records.to_vec());
        Ok(PersistOutcome::Written {
            path: PathBuf::from(unit.year.to_string()).join(unit.file_name()),
            rows: records.len(),
        })
    }
}
