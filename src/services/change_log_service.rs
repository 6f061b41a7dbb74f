//! 变更日志服务（只追加的审计轨迹）

use chrono::{FixedOffset, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::error::AppError;
use crate::models::{
    ChangeLogEntry, ChangeLogFilters, ChangeLogView, Locale, NewChangeLogEntry, RecordKind,
};
use crate::realtime::{EventBus, RealtimeEvent};
use crate::repository::ChangeLogStore;

/// 单条写入失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEntry {
    pub entry: NewChangeLogEntry,
    pub reason: String,
}

/// 部分条目写入失败；`failed` 可以原样重试
#[derive(Debug, Clone, Error)]
#[error("{} change log entries failed to persist ({} written)", .failed.len(), .written.len())]
pub struct PartialWriteFailure {
    pub written: Vec<ChangeLogEntry>,
    pub failed: Vec<FailedEntry>,
}

impl PartialWriteFailure {
    /// 取出失败的条目用于重试
    pub fn into_retryable(self) -> Vec<NewChangeLogEntry> {
        self.failed.into_iter().map(|failed| failed.entry).collect()
    }
}

pub struct ChangeLogService {
    store: Arc<dyn ChangeLogStore>,
    event_bus: EventBus,
    display_offset: FixedOffset,
    locale: Locale,
}

impl ChangeLogService {
    pub fn new(
        store: Arc<dyn ChangeLogStore>,
        event_bus: EventBus,
        display_offset: FixedOffset,
        locale: Locale,
    ) -> Self {
        Self {
            store,
            event_bus,
            display_offset,
            locale,
        }
    }

    /// 逐条追加；单条失败不影响其余条目
    pub async fn append(
        &self,
        entries: Vec<NewChangeLogEntry>,
    ) -> Result<Vec<ChangeLogEntry>, PartialWriteFailure> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(entries.len());
        let mut failed = Vec::new();

        for entry in entries {
            match self.store.insert(entry.clone(), Utc::now()).await {
                Ok(stored) => {
                    metrics::counter!(
                        "change_log_entries_written_total",
                        "kind" => stored.entity_kind.as_str(),
                        "action" => stored.action.as_str()
                    )
                    .increment(1);
                    written.push(stored);
                }
                Err(e) => {
                    metrics::counter!(
                        "change_log_write_failures_total",
                        "kind" => entry.entity_kind.as_str()
                    )
                    .increment(1);
                    tracing::warn!(
                        kind = %entry.entity_kind,
                        code = %entry.code,
                        field = %entry.changed_field,
                        error = %e,
                        "Failed to append change log entry"
                    );
                    failed.push(FailedEntry {
                        entry,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.notify(&written);

        if failed.is_empty() {
            tracing::debug!(entries = written.len(), "Change log entries appended");
            Ok(written)
        } else {
            Err(PartialWriteFailure { written, failed })
        }
    }

    fn notify(&self, written: &[ChangeLogEntry]) {
        let Some(last) = written.last() else {
            return;
        };

        let event = RealtimeEvent::ChangeLogAppended {
            entity_kind: last.entity_kind,
            code: last.code.clone(),
            count: written.len(),
        };
        // 没有订阅者时发布会失败，可以忽略
        if self.event_bus.publish(event).is_err() {
            tracing::trace!("No subscribers for change log events");
        }
    }

    /// 查询变更日志（时间倒序）
    pub async fn query(
        &self,
        filters: &ChangeLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChangeLogEntry>, AppError> {
        Ok(self.store.query(filters, limit, offset).await?)
    }

    pub async fn count(&self, filters: &ChangeLogFilters) -> Result<i64, AppError> {
        Ok(self.store.count(filters).await?)
    }

    /// 单条记录的全部历史
    pub async fn history(
        &self,
        kind: RecordKind,
        code: &str,
    ) -> Result<Vec<ChangeLogEntry>, AppError> {
        let filters = ChangeLogFilters {
            entity_kind: Some(kind),
            code: Some(code.to_string()),
            ..Default::default()
        };
        let total = self.store.count(&filters).await?;
        Ok(self.store.query(&filters, total.max(1), 0).await?)
    }

    /// 转换为日志视图行
    pub fn to_views(&self, entries: &[ChangeLogEntry]) -> Vec<ChangeLogView> {
        entries
            .iter()
            .map(|entry| ChangeLogView::from_entry(entry, self.display_offset, self.locale))
            .collect()
    }
}
