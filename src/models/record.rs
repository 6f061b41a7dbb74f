//! Domain record models (业务记录模型)

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::field_map::{FieldKind, FieldSpec, Locale, Localized};

/// 记录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// 待处理
    #[default]
    Pending,
    /// 处理中
    InProgress,
    /// 已完成
    Done,
    /// 暂停
    OnHold,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::InProgress => "in_progress",
            RecordStatus::Done => "done",
            RecordStatus::OnHold => "on_hold",
        }
    }

    pub fn display(&self, locale: Locale) -> &'static str {
        let text = match self {
            RecordStatus::Pending => Localized::new("대기", "Pending"),
            RecordStatus::InProgress => Localized::new("진행중", "In Progress"),
            RecordStatus::Done => Localized::new("완료", "Done"),
            RecordStatus::OnHold => Localized::new("보류", "On Hold"),
        };
        text.get(locale)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RecordStatus::Pending),
            "in_progress" => Some(RecordStatus::InProgress),
            "done" => Some(RecordStatus::Done),
            "on_hold" => Some(RecordStatus::OnHold),
            _ => None,
        }
    }
}

/// 记录类型（每个管理页面一种）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "record_kind", rename_all = "snake_case")]
pub enum RecordKind {
    Cost,
    Inspection,
    Evaluation,
    MasterCode,
    Voc,
    Software,
    Incident,
    Role,
}

impl RecordKind {
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Cost,
        RecordKind::Inspection,
        RecordKind::Evaluation,
        RecordKind::MasterCode,
        RecordKind::Voc,
        RecordKind::Software,
        RecordKind::Incident,
        RecordKind::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Cost => "cost",
            RecordKind::Inspection => "inspection",
            RecordKind::Evaluation => "evaluation",
            RecordKind::MasterCode => "master_code",
            RecordKind::Voc => "voc",
            RecordKind::Software => "software",
            RecordKind::Incident => "incident",
            RecordKind::Role => "role",
        }
    }

    /// 编码前缀
    pub fn code_prefix(&self) -> &'static str {
        match self {
            RecordKind::Cost => "COST",
            RecordKind::Inspection => "INSP",
            RecordKind::Evaluation => "EVAL",
            RecordKind::MasterCode => "CODE",
            RecordKind::Voc => "VOC",
            RecordKind::Software => "SW",
            RecordKind::Incident => "SEC",
            RecordKind::Role => "ROLE",
        }
    }

    /// 管理页面名称
    pub fn entity_label(&self, locale: Locale) -> &'static str {
        let text = match self {
            RecordKind::Cost => Localized::new("비용 관리", "Cost Management"),
            RecordKind::Inspection => Localized::new("보안 점검", "Security Inspection"),
            RecordKind::Evaluation => Localized::new("인사 평가", "Personnel Evaluation"),
            RecordKind::MasterCode => Localized::new("코드 관리", "Master Code Management"),
            RecordKind::Voc => Localized::new("VOC 관리", "VOC Management"),
            RecordKind::Software => Localized::new("소프트웨어 자산", "Software Assets"),
            RecordKind::Incident => Localized::new("보안 사고", "Security Incident"),
            RecordKind::Role => Localized::new("권한 관리", "Role Management"),
        };
        text.get(locale)
    }

    /// 参与审计比较的字段表
    pub fn field_specs(&self) -> &'static [FieldSpec] {
        match self {
            RecordKind::Cost => COST_FIELDS,
            RecordKind::Inspection => INSPECTION_FIELDS,
            RecordKind::Evaluation => EVALUATION_FIELDS,
            RecordKind::MasterCode => MASTER_CODE_FIELDS,
            RecordKind::Voc => VOC_FIELDS,
            RecordKind::Software => SOFTWARE_FIELDS,
            RecordKind::Incident => INCIDENT_FIELDS,
            RecordKind::Role => ROLE_FIELDS,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown record kind: {}", s))
    }
}

// ==================== Field tables ====================

const BASIC: Localized = Localized::new("기본 정보", "Basic Info");

const TITLE: FieldSpec =
    FieldSpec::new("title", Localized::new("제목", "Title"), BASIC, FieldKind::Text);
const STATUS: FieldSpec =
    FieldSpec::new("status", Localized::new("상태", "Status"), BASIC, FieldKind::Status);
const TEAM: FieldSpec = FieldSpec::new("team", Localized::new("팀", "Team"), BASIC, FieldKind::Text);
const ASSIGNEE: FieldSpec = FieldSpec::new(
    "assignee",
    Localized::new("담당자", "Assignee"),
    BASIC,
    FieldKind::Assignee,
);
const REGISTERED_ON: FieldSpec = FieldSpec::new(
    "registered_on",
    Localized::new("등록일", "Registered On"),
    BASIC,
    FieldKind::Date,
);

const COST: Localized = Localized::new("비용 정보", "Cost Details");
static COST_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new("category", Localized::new("비용 항목", "Category"), COST, FieldKind::Text),
    FieldSpec::new("amount", Localized::new("금액", "Amount"), COST, FieldKind::Amount),
    FieldSpec::new("due_date", Localized::new("지급 예정일", "Due Date"), COST, FieldKind::Date),
    FieldSpec::new("description", Localized::new("설명", "Description"), COST, FieldKind::Text),
];

const INSPECTION: Localized = Localized::new("점검 정보", "Inspection Details");
static INSPECTION_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new(
        "target_system",
        Localized::new("점검 대상", "Target System"),
        INSPECTION,
        FieldKind::Text,
    ),
    FieldSpec::new(
        "inspected_on",
        Localized::new("점검일", "Inspected On"),
        INSPECTION,
        FieldKind::Date,
    ),
    FieldSpec::new("result", Localized::new("점검 결과", "Result"), INSPECTION, FieldKind::Text),
    FieldSpec::new(
        "action_due",
        Localized::new("조치 기한", "Action Due"),
        INSPECTION,
        FieldKind::Date,
    ),
    FieldSpec::new("finding", Localized::new("지적 사항", "Finding"), INSPECTION, FieldKind::Text),
];

const EVALUATION: Localized = Localized::new("평가 정보", "Evaluation Details");
static EVALUATION_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new(
        "evaluatee",
        Localized::new("피평가자", "Evaluatee"),
        EVALUATION,
        FieldKind::Text,
    ),
    FieldSpec::new("period", Localized::new("평가 기간", "Period"), EVALUATION, FieldKind::Text),
    FieldSpec::new("grade", Localized::new("등급", "Grade"), EVALUATION, FieldKind::Text),
    FieldSpec::new("score", Localized::new("점수", "Score"), EVALUATION, FieldKind::Number),
    FieldSpec::new("comment", Localized::new("평가 의견", "Comment"), EVALUATION, FieldKind::Text),
];

const MASTER_CODE: Localized = Localized::new("코드 정보", "Code Details");
static MASTER_CODE_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new(
        "group_code",
        Localized::new("그룹 코드", "Group Code"),
        MASTER_CODE,
        FieldKind::Text,
    ),
    FieldSpec::new(
        "code_value",
        Localized::new("코드 값", "Code Value"),
        MASTER_CODE,
        FieldKind::Text,
    ),
    FieldSpec::new(
        "display_order",
        Localized::new("정렬 순서", "Display Order"),
        MASTER_CODE,
        FieldKind::Number,
    ),
    FieldSpec::new("in_use", Localized::new("사용 여부", "In Use"), MASTER_CODE, FieldKind::Flag),
    FieldSpec::new(
        "description",
        Localized::new("설명", "Description"),
        MASTER_CODE,
        FieldKind::Text,
    ),
];

const VOC: Localized = Localized::new("접수 정보", "Ticket Details");
static VOC_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new("customer", Localized::new("고객", "Customer"), VOC, FieldKind::Text),
    FieldSpec::new("channel", Localized::new("접수 채널", "Channel"), VOC, FieldKind::Text),
    FieldSpec::new("category", Localized::new("유형", "Category"), VOC, FieldKind::Text),
    FieldSpec::new("received_on", Localized::new("접수일", "Received On"), VOC, FieldKind::Date),
    FieldSpec::new("due_date", Localized::new("처리 기한", "Due Date"), VOC, FieldKind::Date),
    FieldSpec::new("response", Localized::new("처리 내용", "Response"), VOC, FieldKind::Text),
];

const SOFTWARE: Localized = Localized::new("라이선스 정보", "License Details");
static SOFTWARE_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new("vendor", Localized::new("제조사", "Vendor"), SOFTWARE, FieldKind::Text),
    FieldSpec::new("version", Localized::new("버전", "Version"), SOFTWARE, FieldKind::Text),
    FieldSpec::new(
        "license_count",
        Localized::new("라이선스 수", "License Count"),
        SOFTWARE,
        FieldKind::Number,
    ),
    FieldSpec::new(
        "license_expiry",
        Localized::new("만료일", "License Expiry"),
        SOFTWARE,
        FieldKind::Date,
    ),
    FieldSpec::new(
        "install_location",
        Localized::new("설치 위치", "Install Location"),
        SOFTWARE,
        FieldKind::Text,
    ),
];

const INCIDENT: Localized = Localized::new("사고 정보", "Incident Details");
static INCIDENT_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new("severity", Localized::new("심각도", "Severity"), INCIDENT, FieldKind::Text),
    FieldSpec::new(
        "occurred_on",
        Localized::new("발생일", "Occurred On"),
        INCIDENT,
        FieldKind::Date,
    ),
    FieldSpec::new(
        "resolved_on",
        Localized::new("해결일", "Resolved On"),
        INCIDENT,
        FieldKind::Date,
    ),
    FieldSpec::new(
        "description",
        Localized::new("사고 내용", "Description"),
        INCIDENT,
        FieldKind::Text,
    ),
    FieldSpec::new(
        "action_taken",
        Localized::new("조치 내용", "Action Taken"),
        INCIDENT,
        FieldKind::Text,
    ),
];

const ROLE: Localized = Localized::new("권한 정보", "Role Details");
static ROLE_FIELDS: &[FieldSpec] = &[
    TITLE,
    STATUS,
    TEAM,
    ASSIGNEE,
    REGISTERED_ON,
    FieldSpec::new("permissions", Localized::new("권한", "Permissions"), ROLE, FieldKind::List),
    FieldSpec::new("description", Localized::new("설명", "Description"), ROLE, FieldKind::Text),
];

// ==================== Records ====================

fn default_active() -> bool {
    true
}

/// 所有记录共享的头部字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecordHeader {
    pub id: Uuid,
    pub seq_no: i64,
    pub registered_on: NaiveDate,
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub status: RecordStatus,
    #[validate(length(min = 1, max = 100))]
    pub team: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 비용 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub category: String,
    pub amount: i64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 보안 점검
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityInspection {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub target_system: String,
    #[serde(default)]
    pub inspected_on: Option<NaiveDate>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub action_due: Option<NaiveDate>,
    #[serde(default)]
    pub finding: Option<String>,
}

/// 인사 평가
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonnelEvaluation {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub evaluatee: String,
    pub period: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// 마스터 코드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterCode {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub group_code: String,
    pub code_value: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub in_use: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// VOC 티켓
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocTicket {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub customer: String,
    pub channel: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub received_on: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub response: Option<String>,
}

/// 소프트웨어 자산
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareAsset {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub vendor: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license_count: i32,
    #[serde(default)]
    pub license_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub install_location: Option<String>,
}

/// 보안 사고
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityIncident {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub severity: String,
    #[serde(default)]
    pub occurred_on: Option<NaiveDate>,
    #[serde(default)]
    pub resolved_on: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action_taken: Option<String>,
}

/// 권한(역할)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(flatten)]
    pub header: RecordHeader,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 业务记录（按 `kind` 标记的联合类型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainRecord {
    Cost(CostItem),
    Inspection(SecurityInspection),
    Evaluation(PersonnelEvaluation),
    MasterCode(MasterCode),
    Voc(VocTicket),
    Software(SoftwareAsset),
    Incident(SecurityIncident),
    Role(RoleRecord),
}

/// 创建后不可修改的字段
pub const IMMUTABLE_KEYS: [&str; 4] = ["id", "code", "seq_no", "kind"];

/// 由存储层维护、不接受客户端写入的字段
const SYSTEM_KEYS: [&str; 7] = [
    "id",
    "code",
    "seq_no",
    "kind",
    "active",
    "created_at",
    "updated_at",
];

impl DomainRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            DomainRecord::Cost(_) => RecordKind::Cost,
            DomainRecord::Inspection(_) => RecordKind::Inspection,
            DomainRecord::Evaluation(_) => RecordKind::Evaluation,
            DomainRecord::MasterCode(_) => RecordKind::MasterCode,
            DomainRecord::Voc(_) => RecordKind::Voc,
            DomainRecord::Software(_) => RecordKind::Software,
            DomainRecord::Incident(_) => RecordKind::Incident,
            DomainRecord::Role(_) => RecordKind::Role,
        }
    }

    pub fn header(&self) -> &RecordHeader {
        match self {
            DomainRecord::Cost(r) => &r.header,
            DomainRecord::Inspection(r) => &r.header,
            DomainRecord::Evaluation(r) => &r.header,
            DomainRecord::MasterCode(r) => &r.header,
            DomainRecord::Voc(r) => &r.header,
            DomainRecord::Software(r) => &r.header,
            DomainRecord::Incident(r) => &r.header,
            DomainRecord::Role(r) => &r.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut RecordHeader {
        match self {
            DomainRecord::Cost(r) => &mut r.header,
            DomainRecord::Inspection(r) => &mut r.header,
            DomainRecord::Evaluation(r) => &mut r.header,
            DomainRecord::MasterCode(r) => &mut r.header,
            DomainRecord::Voc(r) => &mut r.header,
            DomainRecord::Software(r) => &mut r.header,
            DomainRecord::Incident(r) => &mut r.header,
            DomainRecord::Role(r) => &mut r.header,
        }
    }

    pub fn id(&self) -> Uuid {
        self.header().id
    }

    pub fn code(&self) -> &str {
        &self.header().code
    }

    pub fn title(&self) -> &str {
        &self.header().title
    }

    pub fn is_active(&self) -> bool {
        self.header().active
    }

    /// 展开为扁平的字段映射（包含 `kind`）
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }

    /// 浅合并补丁字段，系统字段被忽略
    pub fn apply_patch(
        &self,
        patch: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let mut fields = self.to_fields()?;
        for (key, value) in patch {
            if SYSTEM_KEYS.contains(&key.as_str()) {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }

        let mut updated = Self::from_fields(fields)?;
        updated.header_mut().updated_at = now;
        Ok(updated)
    }
}

// ==================== Codes ====================

static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{2,4}-\d{8}-\d{4,}$").expect("code pattern is a valid regex")
});

/// 生成记录编码，例如 `COST-20240105-0007`
pub fn generate_code(kind: RecordKind, registered_on: NaiveDate, seq_no: i64) -> String {
    format!(
        "{}-{}-{:04}",
        kind.code_prefix(),
        registered_on.format("%Y%m%d"),
        seq_no
    )
}

/// 检查编码格式
pub fn is_valid_code(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

// ==================== Requests ====================

/// 新建记录请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecordRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub status: RecordStatus,
    #[validate(length(min = 1, max = 100))]
    pub team: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub registered_on: Option<NaiveDate>,
    /// 各类型自有字段
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CreateRecordRequest {
    pub fn into_draft(self, kind: RecordKind) -> RecordDraft {
        RecordDraft {
            kind,
            title: self.title,
            status: self.status,
            team: self.team,
            assignee: self.assignee,
            registered_on: self.registered_on,
            fields: self.fields,
        }
    }
}

/// 待存储的新记录（尚未分配 id/编码）
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct RecordDraft {
    pub kind: RecordKind,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub status: RecordStatus,
    #[validate(length(min = 1, max = 100))]
    pub team: String,
    pub assignee: Option<String>,
    pub registered_on: Option<NaiveDate>,
    pub fields: Map<String, Value>,
}

impl RecordDraft {
    pub fn new(kind: RecordKind, title: &str, team: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            status: RecordStatus::Pending,
            team: team.to_string(),
            assignee: None,
            registered_on: None,
            fields: Map::new(),
        }
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, assignee: &str) -> Self {
        self.assignee = Some(assignee.to_string());
        self
    }

    pub fn with_registered_on(mut self, date: NaiveDate) -> Self {
        self.registered_on = Some(date);
        self
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// 登记日期，缺省为当天
    pub fn effective_date(&self, now: DateTime<Utc>) -> NaiveDate {
        self.registered_on.unwrap_or_else(|| now.date_naive())
    }

    /// 组装完整记录
    pub fn assemble(
        self,
        id: Uuid,
        seq_no: i64,
        now: DateTime<Utc>,
    ) -> Result<DomainRecord, serde_json::Error> {
        let registered_on = self.effective_date(now);
        let code = generate_code(self.kind, registered_on, seq_no);

        let mut fields: Map<String, Value> = self
            .fields
            .into_iter()
            .filter(|(key, _)| !SYSTEM_KEYS.contains(&key.as_str()))
            .collect();

        let header = RecordHeader {
            id,
            seq_no,
            registered_on,
            code,
            title: self.title,
            status: self.status,
            team: self.team,
            assignee: self.assignee,
            active: true,
            created_at: now,
            updated_at: now,
        };
        if let Value::Object(header_fields) = serde_json::to_value(header)? {
            fields.extend(header_fields);
        }
        fields.insert("kind".to_string(), Value::String(self.kind.as_str().to_string()));

        DomainRecord::from_fields(fields)
    }
}

/// 记录列表过滤条件（内存过滤）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    pub status: Option<RecordStatus>,
    pub team: Option<String>,
    pub assignee: Option<String>,
    /// 在标题和编码中搜索
    pub search: Option<String>,
    pub registered_from: Option<NaiveDate>,
    pub registered_to: Option<NaiveDate>,
    #[serde(default)]
    pub include_inactive: bool,
}

impl RecordFilter {
    pub fn matches(&self, record: &DomainRecord) -> bool {
        let header = record.header();

        if !self.include_inactive && !header.active {
            return false;
        }
        if let Some(status) = self.status {
            if header.status != status {
                return false;
            }
        }
        if let Some(team) = &self.team {
            if &header.team != team {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if header.assignee.as_deref() != Some(assignee.as_str()) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !header.title.to_lowercase().contains(&needle)
                && !header.code.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(from) = self.registered_from {
            if header.registered_on < from {
                return false;
            }
        }
        if let Some(to) = self.registered_to {
            if header.registered_on > to {
                return false;
            }
        }

        true
    }
}
