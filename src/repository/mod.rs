//! Database repository layer
//!
//! 记录存储与变更日志存储的契约，以及 PostgreSQL / 内存两种实现。

pub mod change_log_repo;
pub mod memory;
pub mod record_repo;

pub use change_log_repo::PgChangeLogStore;
pub use memory::{MemoryChangeLogStore, MemoryRecordStore};
pub use record_repo::PgRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ChangeLogEntry, ChangeLogFilters, DomainRecord, NewChangeLogEntry, RecordDraft, RecordKind,
};

/// 存储层错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("{} record(s) could not be processed", .failed_ids.len())]
    PartialFailure { failed_ids: Vec<Uuid> },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::PersistenceFailed(e.to_string())
    }
}

/// 业务记录存储
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 分配 id、序号与编码后保存
    async fn create(&self, draft: RecordDraft) -> Result<DomainRecord, StoreError>;

    async fn get(&self, kind: RecordKind, id: Uuid) -> Result<Option<DomainRecord>, StoreError>;

    /// 浅合并补丁；记录不存在或已停用时返回 `NotFound`
    async fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<DomainRecord, StoreError>;

    /// 软删除；未命中的 id 通过 `PartialFailure` 返回，其余照常停用
    async fn soft_delete(&self, kind: RecordKind, ids: &[Uuid]) -> Result<(), StoreError>;

    /// 全量读取，按序号排列
    async fn list(
        &self,
        kind: RecordKind,
        include_inactive: bool,
    ) -> Result<Vec<DomainRecord>, StoreError>;
}

/// 追加式变更日志存储
#[async_trait]
pub trait ChangeLogStore: Send + Sync {
    async fn insert(
        &self,
        entry: NewChangeLogEntry,
        occurred_at: DateTime<Utc>,
    ) -> Result<ChangeLogEntry, StoreError>;

    /// 按时间倒序查询
    async fn query(
        &self,
        filters: &ChangeLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChangeLogEntry>, StoreError>;

    async fn count(&self, filters: &ChangeLogFilters) -> Result<i64, StoreError>;
}
