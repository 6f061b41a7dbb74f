//! Field label maps (字段标签映射)
//!
//! 每种记录提供一份静态字段表，按语言渲染为有序的 `FieldLabelMap`，
//! 审计差异比较只比较表中声明的字段，并按声明顺序输出。

use serde::{Deserialize, Serialize};

/// 显示语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// 韩语（默认）
    #[default]
    Ko,
    /// 英语
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ko => "ko",
            Locale::En => "en",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ko" => Ok(Locale::Ko),
            "en" => Ok(Locale::En),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

/// 双语静态文本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localized {
    pub ko: &'static str,
    pub en: &'static str,
}

impl Localized {
    pub const fn new(ko: &'static str, en: &'static str) -> Self {
        Self { ko, en }
    }

    pub fn get(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ko => self.ko,
            Locale::En => self.en,
        }
    }
}

/// 字段语义，决定显示值的归一化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    /// 日期，空值显示为“未定”
    Date,
    /// 负责人，空值显示为“未指定”
    Assignee,
    Status,
    Amount,
    Number,
    Flag,
    List,
}

/// 静态字段定义
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: Localized,
    pub section: Localized,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(
        key: &'static str,
        label: Localized,
        section: Localized,
        kind: FieldKind,
    ) -> Self {
        Self {
            key,
            label,
            section,
            kind,
        }
    }
}

/// 已本地化的字段标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLabel {
    pub key: String,
    pub label: String,
    pub section: String,
    pub kind: FieldKind,
}

/// 有序的字段名 -> 标签映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldLabelMap {
    fields: Vec<FieldLabel>,
}

impl FieldLabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从静态字段表渲染指定语言的映射
    pub fn from_specs(specs: &[FieldSpec], locale: Locale) -> Self {
        let fields = specs
            .iter()
            .map(|spec| FieldLabel {
                key: spec.key.to_string(),
                label: spec.label.get(locale).to_string(),
                section: spec.section.get(locale).to_string(),
                kind: spec.kind,
            })
            .collect();

        Self { fields }
    }

    /// 追加一个纯文本字段（无分区）
    pub fn with(self, key: &str, label: &str) -> Self {
        self.with_field(FieldLabel {
            key: key.to_string(),
            label: label.to_string(),
            section: String::new(),
            kind: FieldKind::Text,
        })
    }

    /// 追加字段；同名字段会替换原有定义但保留其位置
    pub fn with_field(mut self, field: FieldLabel) -> Self {
        match self.fields.iter_mut().find(|f| f.key == field.key) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldLabel> {
        self.fields.iter()
    }

    pub fn get(&self, key: &str) -> Option<&FieldLabel> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
