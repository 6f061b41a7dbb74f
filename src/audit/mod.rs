//! 审计差异比较与变更描述生成

pub mod differ;
pub mod particle;
pub mod template;

pub use differ::{AuditDiffer, NoChangePolicy, ValidationError};
pub use particle::{attach, select_particle, Particle};
