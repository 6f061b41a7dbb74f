//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use chrono::{FixedOffset, Offset, Utc};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::audit::{AuditDiffer, NoChangePolicy};
use crate::models::Locale;

pub use secrecy::{ExposeSecret, Secret};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
    /// 启动时执行迁移
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// 变更描述使用的语言
    pub locale: Locale,
    /// 保存时没有字段变化的处理方式
    pub no_change_policy: NoChangePolicy,
    /// 日志视图显示时间所用的 UTC 偏移（小时）
    pub display_utc_offset_hours: i32,
    /// 实时事件总线容量
    pub event_bus_capacity: usize,
}

impl AuditConfig {
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    pub fn differ(&self) -> AuditDiffer {
        AuditDiffer::new(self.locale, self.no_change_policy)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub audit: AuditConfig,
}

impl AppConfig {
    /// 从环境变量加载配置（前缀为 BACKOFFICE_）
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("server.max_body_bytes", 1024 * 1024)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("database.run_migrations", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("audit.locale", "ko")?
            .set_default("audit.no_change_policy", "emit_generic")?
            .set_default("audit.display_utc_offset_hours", 9)?
            .set_default("audit.event_bus_capacity", 256)?
            .add_source(
                Environment::with_prefix("BACKOFFICE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = settings.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        if self.database.url.expose_secret().trim().is_empty() {
            return Err(ConfigError::Message("database.url must not be empty".to_string()));
        }

        if !(-12..=14).contains(&self.audit.display_utc_offset_hours) {
            return Err(ConfigError::Message(format!(
                "display_utc_offset_hours must be between -12 and 14, got {}",
                self.audit.display_utc_offset_hours
            )));
        }

        if self.audit.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "event_bus_capacity must be greater than 0".to_string(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Message("max_body_bytes must be greater than 0".to_string()));
        }

        Ok(())
    }
}
