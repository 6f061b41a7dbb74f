//! In-memory stores
//! 用于本地开发与测试，不需要数据库

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChangeLogStore, RecordStore, StoreError};
use crate::models::{
    ChangeLogEntry, ChangeLogFilters, DomainRecord, NewChangeLogEntry, RecordDraft, RecordKind,
};

#[derive(Default)]
struct RecordTable {
    records: HashMap<Uuid, DomainRecord>,
    next_seq: HashMap<RecordKind, i64>,
}

/// 内存记录存储
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<RecordTable>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, draft: RecordDraft) -> Result<DomainRecord, StoreError> {
        let mut table = self.inner.write().await;

        let seq_no = table.next_seq.get(&draft.kind).copied().unwrap_or(1);
        let record = draft
            .assemble(Uuid::new_v4(), seq_no, Utc::now())
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?;

        table.next_seq.insert(record.kind(), seq_no + 1);
        table.records.insert(record.id(), record.clone());

        Ok(record)
    }

    async fn get(&self, kind: RecordKind, id: Uuid) -> Result<Option<DomainRecord>, StoreError> {
        let table = self.inner.read().await;
        Ok(table
            .records
            .get(&id)
            .filter(|record| record.kind() == kind)
            .cloned())
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<DomainRecord, StoreError> {
        let mut table = self.inner.write().await;

        let current = table
            .records
            .get(&id)
            .filter(|record| record.kind() == kind && record.is_active())
            .ok_or(StoreError::NotFound(id))?;

        let updated = current
            .apply_patch(&patch, Utc::now())
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?;
        table.records.insert(id, updated.clone());

        Ok(updated)
    }

    async fn soft_delete(&self, kind: RecordKind, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut table = self.inner.write().await;
        let now = Utc::now();
        let mut failed_ids = Vec::new();

        for id in ids {
            match table.records.get_mut(id) {
                Some(record) if record.kind() == kind && record.is_active() => {
                    let header = record.header_mut();
                    header.active = false;
                    header.updated_at = now;
                }
                _ => failed_ids.push(*id),
            }
        }

        if failed_ids.is_empty() {
            Ok(())
        } else {
            Err(StoreError::PartialFailure { failed_ids })
        }
    }

    async fn list(
        &self,
        kind: RecordKind,
        include_inactive: bool,
    ) -> Result<Vec<DomainRecord>, StoreError> {
        let table = self.inner.read().await;
        let mut records: Vec<DomainRecord> = table
            .records
            .values()
            .filter(|record| record.kind() == kind && (include_inactive || record.is_active()))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.header().seq_no);

        Ok(records)
    }
}

/// 内存变更日志存储（只追加）
#[derive(Default)]
pub struct MemoryChangeLogStore {
    entries: RwLock<Vec<ChangeLogEntry>>,
}

impl MemoryChangeLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按写入顺序返回全部条目
    pub async fn snapshot(&self) -> Vec<ChangeLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl ChangeLogStore for MemoryChangeLogStore {
    async fn insert(
        &self,
        entry: NewChangeLogEntry,
        occurred_at: DateTime<Utc>,
    ) -> Result<ChangeLogEntry, StoreError> {
        let mut entries = self.entries.write().await;
        let seq = entries.len() as i64 + 1;
        let stored = entry.stamp(Uuid::new_v4(), seq, occurred_at);
        entries.push(stored.clone());

        Ok(stored)
    }

    async fn query(
        &self,
        filters: &ChangeLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChangeLogEntry>, StoreError> {
        let entries = self.entries.read().await;
        let mut matched: Vec<ChangeLogEntry> = entries
            .iter()
            .filter(|entry| filters.matches(entry))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.seq.cmp(&a.seq)));

        Ok(matched
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filters: &ChangeLogFilters) -> Result<i64, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|entry| filters.matches(entry)).count() as i64)
    }
}
