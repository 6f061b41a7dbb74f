//! 路由注册
//! 组装服务、创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{
    config::AppConfig,
    handlers,
    middleware::AppState,
    realtime::EventBus,
    repository::{ChangeLogStore, RecordStore},
    services::{ChangeLogService, RecordService},
};

/// 基于给定的存储实现创建完整的应用状态
pub fn build_state(
    config: AppConfig,
    db: sqlx::PgPool,
    records: Arc<dyn RecordStore>,
    change_logs: Arc<dyn ChangeLogStore>,
) -> Arc<AppState> {
    let event_bus = EventBus::new(config.audit.event_bus_capacity);

    let change_log_service = Arc::new(ChangeLogService::new(
        change_logs,
        event_bus.clone(),
        config.audit.display_offset(),
        config.audit.locale,
    ));

    let record_service = Arc::new(RecordService::new(
        records,
        change_log_service.clone(),
        config.audit.differ(),
        event_bus.clone(),
    ));

    Arc::new(AppState {
        config,
        db,
        record_service,
        change_log_service,
        event_bus,
    })
}

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    let record_routes = Router::new()
        .route(
            "/api/v1/records/{kind}",
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route(
            "/api/v1/records/{kind}/delete",
            post(handlers::records::delete_records),
        )
        .route(
            "/api/v1/records/{kind}/{id}",
            get(handlers::records::get_record).put(handlers::records::update_record),
        )
        .route(
            "/api/v1/records/{kind}/history/{code}",
            get(handlers::records::record_history),
        );

    let change_log_routes = Router::new()
        .route("/api/v1/change-logs", get(handlers::change_log::list_change_logs))
        .route(
            "/api/v1/stream/change-logs",
            get(handlers::change_log::stream_change_logs),
        )
        .route(
            "/api/v1/field-labels/{kind}",
            get(handlers::change_log::field_labels),
        );

    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        .merge(public_routes)
        .merge(record_routes)
        .merge(change_log_routes)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
