//! HTTP 处理器模块

pub mod change_log;
pub mod health;
pub mod records;
