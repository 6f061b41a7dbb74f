//! 字段级差异比较
//!
//! 比较同一记录的两个快照，为每个变化的字段生成一条描述；
//! 纯函数，不做任何 I/O。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::template::{self, Subject};
use crate::models::{
    ActingContext, ChangeAction, DomainRecord, FieldKind, FieldLabel, FieldLabelMap, Locale,
    NewChangeLogEntry, RecordStatus,
};

/// 差异比较的输入错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Record has no identifier")]
    MissingIdentifier,

    #[error("Record has no code")]
    MissingCode,

    #[error("Snapshots describe different records: {0}")]
    IdentityMismatch(String),

    #[error("Record could not be read: {0}")]
    Unreadable(String),
}

/// 保存后没有检测到字段变化时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoChangePolicy {
    /// 写一条“일반 저장”日志
    #[default]
    EmitGeneric,
    /// 不写日志
    EmitNothing,
}

/// 审计差异比较器
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditDiffer {
    locale: Locale,
    policy: NoChangePolicy,
}

impl AuditDiffer {
    pub fn new(locale: Locale, policy: NoChangePolicy) -> Self {
        Self { locale, policy }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn policy(&self) -> NoChangePolicy {
        self.policy
    }

    /// 比较两个快照并生成变更条目
    ///
    /// `original` 为 `None` 表示新建，只生成一条 create 条目。
    /// 更新时按 `field_map` 的声明顺序输出，每个变化字段一条。
    pub fn diff_and_describe<F>(
        &self,
        original: Option<&DomainRecord>,
        updated: &DomainRecord,
        field_map: &FieldLabelMap,
        entity_label: &str,
        code_of: F,
        actor: &ActingContext,
    ) -> Result<Vec<NewChangeLogEntry>, ValidationError>
    where
        F: Fn(&DomainRecord) -> String,
    {
        let code = validate(updated, &code_of)?;
        let subject = Subject {
            entity_label,
            title: updated.title(),
            code: &code,
        };
        let base = EntryBase {
            updated,
            code: &code,
            actor,
        };

        let original = match original {
            None => {
                let description = template::created(self.locale, &subject);
                return Ok(vec![base.lifecycle(ChangeAction::Create, description)]);
            }
            Some(original) => original,
        };

        if original.id() != updated.id() || original.kind() != updated.kind() {
            return Err(ValidationError::IdentityMismatch(format!(
                "{}:{} vs {}:{}",
                original.kind(),
                original.id(),
                updated.kind(),
                updated.id()
            )));
        }

        let before_fields = read_fields(original)?;
        let after_fields = read_fields(updated)?;

        let mut entries = Vec::new();
        for field in field_map.iter() {
            let before_raw = before_fields.get(&field.key);
            let after_raw = after_fields.get(&field.key);

            let before_value = raw_value(before_raw);
            let after_value = raw_value(after_raw);
            if before_value.trim() == after_value.trim() {
                continue;
            }

            let before_display = display_value(before_raw, field.kind, self.locale);
            let after_display = display_value(after_raw, field.kind, self.locale);

            let description = template::changed(
                self.locale,
                &subject,
                &field.section,
                &field.label,
                &before_display,
                &after_display,
            );
            entries.push(base.field_change(field, before_value, after_value, description));
        }

        if entries.is_empty() && self.policy == NoChangePolicy::EmitGeneric {
            let mut entry = base.lifecycle(
                ChangeAction::Update,
                template::saved_without_change(self.locale, &subject),
            );
            entry.changed_field = template::general_save_label(self.locale).to_string();
            entries.push(entry);
        }

        Ok(entries)
    }

    /// 使用记录类型自带的字段表与页面名称
    pub fn describe_save(
        &self,
        original: Option<&DomainRecord>,
        updated: &DomainRecord,
        actor: &ActingContext,
    ) -> Result<Vec<NewChangeLogEntry>, ValidationError> {
        let kind = updated.kind();
        let field_map = FieldLabelMap::from_specs(kind.field_specs(), self.locale);

        self.diff_and_describe(
            original,
            updated,
            &field_map,
            kind.entity_label(self.locale),
            |record| record.code().to_string(),
            actor,
        )
    }

    /// 软删除：每条记录一条 delete 条目
    pub fn describe_deletion(
        &self,
        record: &DomainRecord,
        actor: &ActingContext,
    ) -> Result<NewChangeLogEntry, ValidationError> {
        let code_of = |r: &DomainRecord| r.code().to_string();
        let code = validate(record, &code_of)?;
        let subject = Subject {
            entity_label: record.kind().entity_label(self.locale),
            title: record.title(),
            code: &code,
        };
        let base = EntryBase {
            updated: record,
            code: &code,
            actor,
        };

        let mut entry = base.lifecycle(ChangeAction::Delete, template::deleted(self.locale, &subject));
        entry.before_value = record.header().status.as_str().to_string();
        Ok(entry)
    }
}

fn validate<F>(record: &DomainRecord, code_of: &F) -> Result<String, ValidationError>
where
    F: Fn(&DomainRecord) -> String,
{
    if record.id().is_nil() {
        return Err(ValidationError::MissingIdentifier);
    }

    let code = code_of(record);
    if code.trim().is_empty() {
        return Err(ValidationError::MissingCode);
    }

    Ok(code)
}

fn read_fields(record: &DomainRecord) -> Result<Map<String, Value>, ValidationError> {
    record
        .to_fields()
        .map_err(|e| ValidationError::Unreadable(e.to_string()))
}

/// 条目的公共部分
struct EntryBase<'a> {
    updated: &'a DomainRecord,
    code: &'a str,
    actor: &'a ActingContext,
}

impl EntryBase<'_> {
    fn team(&self) -> String {
        let team = &self.updated.header().team;
        if team.trim().is_empty() {
            self.actor.team.clone()
        } else {
            team.clone()
        }
    }

    fn lifecycle(&self, action: ChangeAction, description: String) -> NewChangeLogEntry {
        NewChangeLogEntry {
            action,
            entity_kind: self.updated.kind(),
            code: self.code.to_string(),
            title: self.updated.title().to_string(),
            section: String::new(),
            changed_field: String::new(),
            field_key: None,
            before_value: String::new(),
            after_value: String::new(),
            description,
            team: self.team(),
            actor: self.actor.user.clone(),
        }
    }

    fn field_change(
        &self,
        field: &FieldLabel,
        before_value: String,
        after_value: String,
        description: String,
    ) -> NewChangeLogEntry {
        NewChangeLogEntry {
            action: ChangeAction::Update,
            entity_kind: self.updated.kind(),
            code: self.code.to_string(),
            title: self.updated.title().to_string(),
            section: field.section.clone(),
            changed_field: field.label.clone(),
            field_key: Some(field.key.clone()),
            before_value,
            after_value,
            description,
            team: self.team(),
            actor: self.actor.user.clone(),
        }
    }
}

/// 原始值的字符串形式；缺失或 null 为空串
fn raw_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| raw_value(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn empty_display(kind: FieldKind, locale: Locale) -> &'static str {
    match (kind, locale) {
        (FieldKind::Date, Locale::Ko) => "미정",
        (FieldKind::Date, Locale::En) => "TBD",
        (FieldKind::Assignee, Locale::Ko) => "미지정",
        (FieldKind::Assignee, Locale::En) => "Unassigned",
        _ => "-",
    }
}

/// 描述中使用的显示值
fn display_value(value: Option<&Value>, kind: FieldKind, locale: Locale) -> String {
    let raw = raw_value(value);
    if raw.trim().is_empty() {
        return empty_display(kind, locale).to_string();
    }

    match kind {
        FieldKind::Status => RecordStatus::parse(&raw)
            .map(|status| status.display(locale).to_string())
            .unwrap_or(raw),
        FieldKind::Amount => match value.and_then(Value::as_i64) {
            Some(amount) => group_thousands(amount),
            None => raw,
        },
        FieldKind::Flag => match value.and_then(Value::as_bool) {
            Some(true) if locale == Locale::Ko => "사용".to_string(),
            Some(false) if locale == Locale::Ko => "미사용".to_string(),
            Some(true) => "Yes".to_string(),
            Some(false) => "No".to_string(),
            None => raw,
        },
        FieldKind::Text
        | FieldKind::Date
        | FieldKind::Assignee
        | FieldKind::Number
        | FieldKind::List => raw,
    }
}

fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
