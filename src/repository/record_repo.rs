//! Record repository (业务记录数据访问)

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::models::{DomainRecord, RecordDraft, RecordKind};

/// 记录以 JSONB 形式保存在 `domain_records` 表中
pub struct PgRecordStore {
    db: PgPool,
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    payload: Json<Value>,
    active: bool,
}

impl RecordRow {
    fn into_record(self) -> Result<DomainRecord, StoreError> {
        let mut record: DomainRecord = serde_json::from_value(self.payload.0)
            .map_err(|e| StoreError::PersistenceFailed(format!("Corrupt record payload: {}", e)))?;
        record.header_mut().active = self.active;
        Ok(record)
    }
}

fn payload_of(record: &DomainRecord) -> Result<Json<Value>, StoreError> {
    record
        .to_fields()
        .map(|fields| Json(Value::Object(fields)))
        .map_err(|e| StoreError::PersistenceFailed(e.to_string()))
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create(&self, draft: RecordDraft) -> Result<DomainRecord, StoreError> {
        let kind = draft.kind;
        let mut tx = self.db.begin().await?;

        // 同类型记录的序号分配串行化
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;

        let seq_no: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(seq_no), 0) + 1 FROM domain_records WHERE kind = $1",
        )
        .bind(kind)
        .fetch_one(&mut *tx)
        .await?;

        let record = draft
            .assemble(Uuid::new_v4(), seq_no, Utc::now())
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?;
        let header = record.header();

        sqlx::query(
            r#"
            INSERT INTO domain_records (id, kind, seq_no, code, active, payload, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(header.id)
        .bind(kind)
        .bind(header.seq_no)
        .bind(&header.code)
        .bind(header.active)
        .bind(payload_of(&record)?)
        .bind(header.created_at)
        .bind(header.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn get(&self, kind: RecordKind, id: Uuid) -> Result<Option<DomainRecord>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT payload, active FROM domain_records WHERE kind = $1 AND id = $2",
        )
        .bind(kind)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(RecordRow::into_record).transpose()
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<DomainRecord, StoreError> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, RecordRow>(
            "SELECT payload, active FROM domain_records WHERE kind = $1 AND id = $2 FOR UPDATE",
        )
        .bind(kind)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .map(RecordRow::into_record)
        .transpose()?
        .filter(DomainRecord::is_active)
        .ok_or(StoreError::NotFound(id))?;

        let updated = current
            .apply_patch(&patch, Utc::now())
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE domain_records
            SET payload = $3, updated_at = $4
            WHERE kind = $1 AND id = $2
            "#,
        )
        .bind(kind)
        .bind(id)
        .bind(payload_of(&updated)?)
        .bind(updated.header().updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn soft_delete(&self, kind: RecordKind, ids: &[Uuid]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let deleted: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE domain_records
            SET active = FALSE,
                payload = jsonb_set(payload, '{active}', 'false'::jsonb),
                updated_at = NOW()
            WHERE kind = $1 AND id = ANY($2) AND active
            RETURNING id
            "#,
        )
        .bind(kind)
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        let failed_ids: Vec<Uuid> = ids.iter().filter(|id| !deleted.contains(id)).copied().collect();

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
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT payload, active FROM domain_records
            WHERE kind = $1 AND (active OR $2)
            ORDER BY seq_no
            "#,
        )
        .bind(kind)
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(RecordRow::into_record).collect()
    }
}
