//! 后台业务记录系统库
//! 业务记录的增删改查与字段级变更日志

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
