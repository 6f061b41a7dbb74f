//! 变更日志的 HTTP 处理器

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::records::{check_code, parse_kind};
use crate::{
    error::AppError,
    middleware::AppState,
    models::{ChangeLogFilters, FieldLabelMap, RecordKind},
};

const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub kind: Option<RecordKind>,
}

/// 查询变更日志（时间倒序）
pub async fn list_change_logs(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<ChangeLogFilters>,
    Query(page): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(code) = &filters.code {
        check_code(code)?;
    }
    let limit = page.limit.clamp(1, MAX_LIMIT);
    let offset = page.offset.max(0);

    let service = &state.change_log_service;
    let entries = service.query(&filters, limit, offset).await?;
    let total = service.count(&filters).await?;
    let logs = service.to_views(&entries);

    Ok(Json(json!({
        "logs": logs,
        "count": logs.len(),
        "total": total
    })))
}

/// 变更日志刷新信号（SSE）
pub async fn stream_change_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let stream = state
        .event_bus
        .subscribe_to_change_logs(query.kind)
        .into_sse_stream();

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// 某类记录的字段标签表
pub async fn field_labels(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let locale = state.config.audit.locale;
    let fields = FieldLabelMap::from_specs(kind.field_specs(), locale);

    Ok(Json(json!({
        "kind": kind,
        "entity_label": kind.entity_label(locale),
        "fields": fields
    })))
}
