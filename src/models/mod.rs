//! 数据模型模块
//! 业务记录、字段标签映射与变更日志

pub mod acting;
pub mod change_log;
pub mod field_map;
pub mod page;
pub mod record;

pub use acting::ActingContext;
pub use change_log::{ChangeAction, ChangeLogEntry, ChangeLogFilters, ChangeLogView, NewChangeLogEntry};
pub use field_map::{FieldKind, FieldLabel, FieldLabelMap, FieldSpec, Locale, Localized};
pub use page::{Page, PageQuery};
pub use record::{DomainRecord, RecordDraft, RecordFilter, RecordHeader, RecordKind, RecordStatus};
