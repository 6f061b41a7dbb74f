//! Business logic services layer

pub mod change_log_service;
pub mod record_service;

pub use change_log_service::{ChangeLogService, FailedEntry, PartialWriteFailure};
pub use record_service::{DeleteOutcome, RecordService, SaveOutcome};
