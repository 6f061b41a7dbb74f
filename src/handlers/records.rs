//! 业务记录的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::AppState,
    models::{
        record::{is_valid_code, CreateRecordRequest},
        ActingContext, PageQuery, RecordFilter, RecordKind,
    },
};

#[derive(Debug, Deserialize)]
pub struct DeleteRecordsRequest {
    pub ids: Vec<Uuid>,
}

/// 解析路径中的记录类型
pub fn parse_kind(kind: &str) -> Result<RecordKind, AppError> {
    kind.parse::<RecordKind>()
        .map_err(|_| AppError::NotFound(format!("Record kind '{}'", kind)))
}

/// 检查记录编码格式，例如 `VOC-20240301-0001`
pub fn check_code(code: &str) -> Result<(), AppError> {
    if is_valid_code(code) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid record code '{}'", code)))
    }
}

/// 列出记录（过滤 + 分页）
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(filter): Query<RecordFilter>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let page = state.record_service.list(kind, &filter, page).await?;

    Ok(Json(page))
}

/// 获取单条记录
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let record = state.record_service.get(kind, id).await?;

    Ok(Json(record))
}

/// 新建记录
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    actor: ActingContext,
    Path(kind): Path<String>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    req.validate()?;

    let outcome = state
        .record_service
        .create(req.into_draft(kind), &actor)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// 更新记录（浅合并）
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    actor: ActingContext,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let outcome = state.record_service.update(kind, id, patch, &actor).await?;

    Ok(Json(outcome))
}

/// 批量软删除
pub async fn delete_records(
    State(state): State<Arc<AppState>>,
    actor: ActingContext,
    Path(kind): Path<String>,
    Json(req): Json<DeleteRecordsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let outcome = state
        .record_service
        .soft_delete(kind, &req.ids, &actor)
        .await?;

    Ok(Json(outcome))
}

/// 单条记录的变更历史
pub async fn record_history(
    State(state): State<Arc<AppState>>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    check_code(&code)?;
    let entries = state.change_log_service.history(kind, &code).await?;
    let logs = state.change_log_service.to_views(&entries);

    Ok(Json(json!({
        "code": code,
        "logs": logs,
        "count": logs.len()
    })))
}
