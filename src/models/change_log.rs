//! Change log domain models (变更日志模型)

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field_map::{Locale, Localized};
use super::record::RecordKind;

/// 日志视图中“不适用”的占位符
pub const PLACEHOLDER: &str = "-";

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "change_action", rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "create",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
        }
    }

    pub fn display(&self, locale: Locale) -> &'static str {
        let text = match self {
            ChangeAction::Create => Localized::new("생성", "Create"),
            ChangeAction::Update => Localized::new("수정", "Update"),
            ChangeAction::Delete => Localized::new("삭제", "Delete"),
        };
        text.get(locale)
    }
}

impl std::str::FromStr for ChangeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ChangeAction::Create),
            "update" => Ok(ChangeAction::Update),
            "delete" => Ok(ChangeAction::Delete),
            other => Err(format!("Unknown change action: {}", other)),
        }
    }
}

/// 待写入的变更条目（差异比较的输出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChangeLogEntry {
    pub action: ChangeAction,
    pub entity_kind: RecordKind,
    pub code: String,
    pub title: String,
    pub section: String,
    /// 变更字段的显示标签
    pub changed_field: String,
    pub field_key: Option<String>,
    /// 原始值（未做显示归一化）
    pub before_value: String,
    pub after_value: String,
    pub description: String,
    pub team: String,
    pub actor: String,
}

impl NewChangeLogEntry {
    /// 写入时盖上 id、序号与时间戳
    pub fn stamp(self, id: Uuid, seq: i64, occurred_at: DateTime<Utc>) -> ChangeLogEntry {
        ChangeLogEntry {
            id,
            seq,
            occurred_at,
            action: self.action,
            entity_kind: self.entity_kind,
            code: self.code,
            title: self.title,
            section: self.section,
            changed_field: self.changed_field,
            field_key: self.field_key,
            before_value: self.before_value,
            after_value: self.after_value,
            description: self.description,
            team: self.team,
            actor: self.actor,
        }
    }
}

/// Stored change log entry (append-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChangeLogEntry {
    pub id: Uuid,
    pub seq: i64,
    pub occurred_at: DateTime<Utc>,
    pub action: ChangeAction,
    pub entity_kind: RecordKind,
    pub code: String,
    pub title: String,
    pub section: String,
    pub changed_field: String,
    pub field_key: Option<String>,
    pub before_value: String,
    pub after_value: String,
    pub description: String,
    pub team: String,
    pub actor: String,
}

/// Change log filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeLogFilters {
    pub entity_kind: Option<RecordKind>,
    pub code: Option<String>,
    pub action: Option<ChangeAction>,
    pub actor: Option<String>,
    pub team: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// 在描述中搜索（不区分大小写）
    pub search: Option<String>,
}

impl ChangeLogFilters {
    pub fn matches(&self, entry: &ChangeLogEntry) -> bool {
        if self.entity_kind.is_some_and(|kind| kind != entry.entity_kind) {
            return false;
        }
        if self.code.as_ref().is_some_and(|code| code != &entry.code) {
            return false;
        }
        if self.action.is_some_and(|action| action != entry.action) {
            return false;
        }
        if self.actor.as_ref().is_some_and(|actor| actor != &entry.actor) {
            return false;
        }
        if self.team.as_ref().is_some_and(|team| team != &entry.team) {
            return false;
        }
        if self.start_time.is_some_and(|start| entry.occurred_at < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| entry.occurred_at > end) {
            return false;
        }
        if let Some(search) = &self.search {
            if !entry
                .description
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// 日志视图行，全部为字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogView {
    pub id: String,
    pub date_time: String,
    pub title: String,
    pub code: String,
    pub action: String,
    pub section: String,
    pub changed_field: String,
    pub before_value: String,
    pub after_value: String,
    pub description: String,
    pub team: String,
    pub user: String,
}

fn or_placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

impl ChangeLogView {
    pub fn from_entry(entry: &ChangeLogEntry, offset: FixedOffset, locale: Locale) -> Self {
        Self {
            id: entry.id.to_string(),
            date_time: entry
                .occurred_at
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            title: or_placeholder(&entry.title),
            code: or_placeholder(&entry.code),
            action: entry.action.display(locale).to_string(),
            section: or_placeholder(&entry.section),
            changed_field: or_placeholder(&entry.changed_field),
            before_value: or_placeholder(&entry.before_value),
            after_value: or_placeholder(&entry.after_value),
            description: or_placeholder(&entry.description),
            team: or_placeholder(&entry.team),
            user: or_placeholder(&entry.actor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChangeLogEntry {
        NewChangeLogEntry {
            action: ChangeAction::Delete,
            entity_kind: RecordKind::Voc,
            code: "VOC-20240301-0001".to_string(),
            title: "배송 지연".to_string(),
            section: String::new(),
            changed_field: String::new(),
            field_key: None,
            before_value: "pending".to_string(),
            after_value: String::new(),
            description: "VOC 관리 배송 지연(VOC-20240301-0001) 레코드가 삭제되었습니다.".to_string(),
            team: "고객지원팀".to_string(),
            actor: "홍길동".to_string(),
        }
        .stamp(
            Uuid::new_v4(),
            1,
            DateTime::parse_from_rfc3339("2024-03-01T23:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn test_view_formats_local_time_and_placeholders() {
        let entry = sample();
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let view = ChangeLogView::from_entry(&entry, kst, Locale::Ko);

        assert_eq!(view.date_time, "2024-03-02 08:30:00");
        assert_eq!(view.action, "삭제");
        assert_eq!(view.after_value, PLACEHOLDER);
        assert_eq!(view.section, PLACEHOLDER);
        assert_eq!(view.before_value, "pending");
        assert_eq!(view.user, "홍길동");
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let view = ChangeLogView::from_entry(&sample(), FixedOffset::east_opt(0).unwrap(), Locale::En);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["action"], "Delete");
        assert!(json["dateTime"].is_string());
        assert!(json["changedField"].is_string());
        assert!(json["beforeValue"].is_string());
    }

    #[test]
    fn test_filters() {
        let entry = sample();
        assert!(ChangeLogFilters::default().matches(&entry));
        assert!(ChangeLogFilters {
            entity_kind: Some(RecordKind::Voc),
            action: Some(ChangeAction::Delete),
            search: Some("배송".to_string()),
            ..Default::default()
        }
        .matches(&entry));
        assert!(!ChangeLogFilters {
            entity_kind: Some(RecordKind::Cost),
            ..Default::default()
        }
        .matches(&entry));
        assert!(!ChangeLogFilters {
            actor: Some("someone".to_string()),
            ..Default::default()
        }
        .matches(&entry));
    }

    #[test]
    fn test_search_is_case_insensitive_and_literal() {
        let entry = sample();
        let search = |term: &str| ChangeLogFilters {
            search: Some(term.to_string()),
            ..Default::default()
        };

        assert!(search("voc-20240301").matches(&entry));
        assert!(search("VOC 관리").matches(&entry));
        assert!(!search("%").matches(&entry));
        assert!(!search("배송_지연").matches(&entry));
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("update".parse::<ChangeAction>(), Ok(ChangeAction::Update));
        assert!("rename".parse::<ChangeAction>().is_err());
    }
}
