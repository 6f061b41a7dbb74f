//! Change log repository (变更日志数据访问)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ChangeLogStore, StoreError};
use crate::models::{ChangeLogEntry, ChangeLogFilters, NewChangeLogEntry};

pub struct PgChangeLogStore {
    db: PgPool,
}

impl PgChangeLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 追加过滤条件
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filters: &'a ChangeLogFilters) {
    if let Some(kind) = filters.entity_kind {
        builder.push(" AND entity_kind = ").push_bind(kind);
    }
    if let Some(code) = &filters.code {
        builder.push(" AND code = ").push_bind(code);
    }
    if let Some(action) = filters.action {
        builder.push(" AND action = ").push_bind(action);
    }
    if let Some(actor) = &filters.actor {
        builder.push(" AND actor = ").push_bind(actor);
    }
    if let Some(team) = &filters.team {
        builder.push(" AND team = ").push_bind(team);
    }
    if let Some(start_time) = filters.start_time {
        builder.push(" AND occurred_at >= ").push_bind(start_time);
    }
    if let Some(end_time) = filters.end_time {
        builder.push(" AND occurred_at <= ").push_bind(end_time);
    }
    if let Some(search) = &filters.search {
        builder
            .push(" AND description ILIKE ")
            .push_bind(format!("%{}%", escape_like(search)))
            .push(r" ESCAPE '\'");
    }
}

/// 转义 LIKE 通配符，使搜索词按字面匹配
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}


#[async_trait]
impl ChangeLogStore for PgChangeLogStore {
    async fn insert(
        &self,
        entry: NewChangeLogEntry,
        occurred_at: DateTime<Utc>,
    ) -> Result<ChangeLogEntry, StoreError> {
        let stored = sqlx::query_as::<_, ChangeLogEntry>(
            r#"
            INSERT INTO change_logs (
                id, occurred_at, action, entity_kind, code, title, section, changed_field,
                field_key, before_value, after_value, description, team, actor
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(occurred_at)
        .bind(entry.action)
        .bind(entry.entity_kind)
        .bind(&entry.code)
        .bind(&entry.title)
        .bind(&entry.section)
        .bind(&entry.changed_field)
        .bind(&entry.field_key)
        .bind(&entry.before_value)
        .bind(&entry.after_value)
        .bind(&entry.description)
        .bind(&entry.team)
        .bind(&entry.actor)
        .fetch_one(&self.db)
        .await?;

        Ok(stored)
    }

    async fn query(
        &self,
        filters: &ChangeLogFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChangeLogEntry>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM change_logs WHERE 1=1");
        push_filters(&mut builder, filters);
        builder
            .push(" ORDER BY occurred_at DESC, seq DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let logs = builder
            .build_query_as::<ChangeLogEntry>()
            .fetch_all(&self.db)
            .await?;

        Ok(logs)
    }

    async fn count(&self, filters: &ChangeLogFilters) -> Result<i64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM change_logs WHERE 1=1");
        push_filters(&mut builder, filters);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.db).await?;
        Ok(count)
    }
}
