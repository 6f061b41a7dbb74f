//! 日志与追踪系统
//! 初始化结构化日志和指标收集

use crate::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 初始化日志与追踪系统
pub fn init_telemetry(config: &AppConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_layer = match config.logging.format.to_lowercase().as_str() {
        "pretty" => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.logging.level,
        format = %config.logging.format,
        locale = config.audit.locale.as_str(),
        "Telemetry initialized"
    );
}

/// 描述服务导出的指标（metrics 0.24 在首次使用时创建指标）
pub fn init_metrics() {
    metrics::describe_counter!(
        "change_log_entries_written_total",
        "Change log entries appended to the audit trail"
    );
    metrics::describe_counter!(
        "change_log_write_failures_total",
        "Change log entries that failed to persist"
    );
    metrics::describe_counter!("http_requests_total", "HTTP requests served");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
    tracing::debug!("Metrics initialized");
}
