//! 变更描述语句模板

use super::particle::{select_particle, Particle};
use crate::models::Locale;

/// 语句主体：“{页面} {标题}({编码})”
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub entity_label: &'a str,
    pub title: &'a str,
    pub code: &'a str,
}

impl Subject<'_> {
    fn render(&self) -> String {
        format!("{} {}({})", self.entity_label, self.title, self.code)
    }
}

/// 无字段变化时使用的变更字段标签
pub fn general_save_label(locale: Locale) -> &'static str {
    match locale {
        Locale::Ko => "일반 저장",
        Locale::En => "General save",
    }
}

pub fn created(locale: Locale, subject: &Subject<'_>) -> String {
    match locale {
        Locale::Ko => format!("{} 레코드가 생성되었습니다.", subject.render()),
        Locale::En => format!("{} record was created.", subject.render()),
    }
}

pub fn deleted(locale: Locale, subject: &Subject<'_>) -> String {
    match locale {
        Locale::Ko => format!("{} 레코드가 삭제되었습니다.", subject.render()),
        Locale::En => format!("{} record was deleted.", subject.render()),
    }
}

pub fn saved_without_change(locale: Locale, subject: &Subject<'_>) -> String {
    match locale {
        Locale::Ko => format!("{} 레코드가 저장되었습니다. (변경된 항목 없음)", subject.render()),
        Locale::En => format!(
            "{} record was saved with no detected field changes.",
            subject.render()
        ),
    }
}

fn field_phrase(section: &str, label: &str) -> String {
    if section.is_empty() {
        label.to_string()
    } else {
        format!("{} {}", section, label)
    }
}

/// 单字段变更描述
pub fn changed(
    locale: Locale,
    subject: &Subject<'_>,
    section: &str,
    label: &str,
    before: &str,
    after: &str,
) -> String {
    let field = field_phrase(section, label);

    match locale {
        Locale::Ko => format!(
            "{} 레코드의 {}{} '{}'에서 '{}'{} 변경되었습니다.",
            subject.render(),
            field,
            select_particle(label, Particle::Subject),
            before,
            after,
            select_particle(after, Particle::Direction),
        ),
        Locale::En => format!(
            "{} record's {} changed from '{}' to '{}'.",
            subject.render(),
            field,
            before,
            after
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECT: Subject<'static> = Subject {
        entity_label: "비용 관리",
        title: "서버 증설",
        code: "COST-20240305-0001",
    };

    #[test]
    fn test_created_sentence() {
        assert_eq!(
            created(Locale::Ko, &SUBJECT),
            "비용 관리 서버 증설(COST-20240305-0001) 레코드가 생성되었습니다."
        );
        assert_eq!(
            created(Locale::En, &SUBJECT),
            "비용 관리 서버 증설(COST-20240305-0001) record was created."
        );
    }

    #[test]
    fn test_changed_sentence_uses_particles() {
        let text = changed(Locale::Ko, &SUBJECT, "기본 정보", "상태", "대기", "진행중");
        assert_eq!(
            text,
            "비용 관리 서버 증설(COST-20240305-0001) 레코드의 기본 정보 상태가 '대기'에서 '진행중'으로 변경되었습니다."
        );

        let text = changed(Locale::Ko, &SUBJECT, "비용 정보", "금액", "1,000", "2,000");
        assert!(text.contains("금액이 '1,000'에서 '2,000'로 변경되었습니다."));
    }

    #[test]
    fn test_changed_sentence_without_section() {
        let subject = Subject {
            entity_label: "VOC Management",
            title: "Late delivery",
            code: "VOC-20240301-0002",
        };
        assert_eq!(
            changed(Locale::En, &subject, "", "Status", "pending", "done"),
            "VOC Management Late delivery(VOC-20240301-0002) record's Status changed from 'pending' to 'done'."
        );
    }

    #[test]
    fn test_general_save() {
        assert_eq!(general_save_label(Locale::Ko), "일반 저장");
        assert!(saved_without_change(Locale::Ko, &SUBJECT).ends_with("(변경된 항목 없음)"));
    }
}
