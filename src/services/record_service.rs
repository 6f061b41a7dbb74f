//! 业务记录服务：保存流程
//!
//! 存储写入成功后比较快照，并把生成的变更条目交给变更日志服务。

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::change_log_service::ChangeLogService;
use crate::audit::AuditDiffer;
use crate::error::{AppError, Result};
use crate::models::record::IMMUTABLE_KEYS;
use crate::models::{
    ActingContext, DomainRecord, NewChangeLogEntry, Page, PageQuery, RecordDraft, RecordFilter,
    RecordKind,
};
use crate::realtime::{EventBus, RealtimeEvent};
use crate::repository::{RecordStore, StoreError};

/// 保存结果
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub record: DomainRecord,
    /// 成功写入的日志条数
    pub logged: usize,
    /// 写入失败的日志条数
    pub audit_failures: usize,
}

/// 批量删除结果
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub deleted: Vec<Uuid>,
    pub logged: usize,
    pub audit_failures: usize,
}

pub struct RecordService {
    store: Arc<dyn RecordStore>,
    change_logs: Arc<ChangeLogService>,
    differ: AuditDiffer,
    event_bus: EventBus,
}

impl RecordService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        change_logs: Arc<ChangeLogService>,
        differ: AuditDiffer,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            change_logs,
            differ,
            event_bus,
        }
    }

    pub fn differ(&self) -> &AuditDiffer {
        &self.differ
    }

    /// 新建记录
    pub async fn create(&self, draft: RecordDraft, actor: &ActingContext) -> Result<SaveOutcome> {
        draft.validate()?;
        let kind = draft.kind;

        let record = self.store.create(draft).await?;
        tracing::info!(
            kind = %kind,
            code = %record.code(),
            record_id = %record.id(),
            actor = %actor.user,
            "Record created"
        );
        self.signal(kind);

        let entries = self.differ.describe_save(None, &record, actor)?;
        let (logged, audit_failures) = self.record_changes(entries).await;

        Ok(SaveOutcome {
            record,
            logged,
            audit_failures,
        })
    }

    /// 更新记录；补丁中不能修改身份字段
    pub async fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Map<String, Value>,
        actor: &ActingContext,
    ) -> Result<SaveOutcome> {
        let original = self
            .store
            .get(kind, id)
            .await?
            .filter(DomainRecord::is_active)
            .ok_or_else(|| AppError::not_found("Record"))?;

        check_immutable(&original, &patch)?;
        check_header(&original, &patch)?;

        let updated = self.store.update(kind, id, patch).await?;
        tracing::info!(
            kind = %kind,
            code = %updated.code(),
            record_id = %id,
            actor = %actor.user,
            "Record updated"
        );
        self.signal(kind);

        let entries = self.differ.describe_save(Some(&original), &updated, actor)?;
        let (logged, audit_failures) = self.record_changes(entries).await;

        Ok(SaveOutcome {
            record: updated,
            logged,
            audit_failures,
        })
    }

    /// 批量软删除，每条成功删除的记录写一条 delete 日志
    pub async fn soft_delete(
        &self,
        kind: RecordKind,
        ids: &[Uuid],
        actor: &ActingContext,
    ) -> Result<DeleteOutcome> {
        if ids.is_empty() {
            return Err(AppError::BadRequest("No records selected".to_string()));
        }

        // 同一 id 只处理一次，保持首次出现的顺序
        let mut seen = HashSet::with_capacity(ids.len());
        let ids: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut originals = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(record) = self.store.get(kind, *id).await? {
                originals.push(record);
            }
        }

        let failed_ids = match self.store.soft_delete(kind, &ids).await {
            Ok(()) => Vec::new(),
            Err(StoreError::PartialFailure { failed_ids }) => failed_ids,
            Err(e) => return Err(e.into()),
        };

        let deleted: Vec<DomainRecord> = originals
            .into_iter()
            .filter(|record| !failed_ids.contains(&record.id()))
            .collect();

        let mut entries = Vec::with_capacity(deleted.len());
        for record in &deleted {
            entries.push(self.differ.describe_deletion(record, actor)?);
        }

        if !deleted.is_empty() {
            self.signal(kind);
        }
        let (logged, audit_failures) = self.record_changes(entries).await;

        tracing::info!(
            kind = %kind,
            deleted = deleted.len(),
            failed = failed_ids.len(),
            actor = %actor.user,
            "Records soft-deleted"
        );

        if !failed_ids.is_empty() {
            return Err(AppError::PartialFailure { failed_ids });
        }

        Ok(DeleteOutcome {
            deleted: deleted.iter().map(DomainRecord::id).collect(),
            logged,
            audit_failures,
        })
    }

    /// 全量拉取后在内存中过滤并分页
    pub async fn list(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
        page: PageQuery,
    ) -> Result<Page<DomainRecord>> {
        let records = self.store.list(kind, filter.include_inactive).await?;
        let matched: Vec<DomainRecord> = records
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();

        Ok(Page::paginate(matched, page))
    }

    pub async fn get(&self, kind: RecordKind, id: Uuid) -> Result<DomainRecord> {
        self.store
            .get(kind, id)
            .await?
            .ok_or_else(|| AppError::not_found("Record"))
    }

    /// 追加日志；失败只记录告警，不回滚已保存的记录
    async fn record_changes(&self, entries: Vec<NewChangeLogEntry>) -> (usize, usize) {
        match self.change_logs.append(entries).await {
            Ok(written) => (written.len(), 0),
            Err(failure) => {
                tracing::warn!(
                    written = failure.written.len(),
                    failed = failure.failed.len(),
                    "Change log is incomplete for this save"
                );
                (failure.written.len(), failure.failed.len())
            }
        }
    }

    fn signal(&self, kind: RecordKind) {
        let _ = self.event_bus.publish(RealtimeEvent::RecordsChanged { kind });
    }
}

/// 补丁里出现的身份字段必须与当前值一致
fn check_immutable(original: &DomainRecord, patch: &Map<String, Value>) -> Result<()> {
    let current = original
        .to_fields()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    for key in IMMUTABLE_KEYS {
        if let Some(value) = patch.get(key) {
            if current.get(key) != Some(value) {
                return Err(AppError::Validation(format!("Field '{}' cannot be changed", key)));
            }
        }
    }

    Ok(())
}

/// 合并后的头部字段仍需满足新建时的约束
fn check_header(original: &DomainRecord, patch: &Map<String, Value>) -> Result<()> {
    let merged = original
        .apply_patch(patch, Utc::now())
        .map_err(|e| AppError::Validation(e.to_string()))?;
    merged.header().validate()?;
    Ok(())
}
