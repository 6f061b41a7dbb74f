//! 保存流程测试：记录存储 + 差异比较 + 变更日志

use backoffice_system::{
    error::AppError,
    models::{ActingContext, ChangeAction, PageQuery, RecordFilter, RecordKind, RecordStatus},
    repository::{MemoryChangeLogStore, MemoryRecordStore, RecordStore},
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

mod common;
use common::{
    cost_draft, create_test_app, create_test_app_state, patch, voc_draft, FailingRecordStore,
    FlakyChangeLogStore,
};

fn actor() -> ActingContext {
    ActingContext::new("홍길동", "고객지원팀")
}

#[tokio::test]
async fn test_create_logs_single_create_entry() {
    let app = create_test_app();
    let service = &app.state.record_service;

    let outcome = service.create(voc_draft("배송 문의"), &actor()).await.unwrap();

    assert_eq!(outcome.logged, 1);
    assert_eq!(outcome.audit_failures, 0);
    assert!(outcome.record.code().starts_with("VOC-"));

    let logs = app.change_logs.snapshot().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, ChangeAction::Create);
    assert_eq!(logs[0].code, outcome.record.code());
    assert_eq!(logs[0].actor, "홍길동");
}

#[tokio::test]
async fn test_create_rejects_invalid_draft() {
    let app = create_test_app();

    let err = app
        .state
        .record_service
        .create(voc_draft(""), &actor())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(app.change_logs.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_update_status_logs_one_entry() {
    let app = create_test_app();
    let service = &app.state.record_service;
    let created = service.create(voc_draft("배송 문의"), &actor()).await.unwrap().record;

    let outcome = service
        .update(
            RecordKind::Voc,
            created.id(),
            patch(&[("status", json!("done"))]),
            &actor(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.header().status, RecordStatus::Done);
    assert_eq!(outcome.logged, 1);

    let logs = app.change_logs.snapshot().await;
    let update = &logs[1];
    assert_eq!(update.action, ChangeAction::Update);
    assert_eq!(update.changed_field, "상태");
    assert_eq!(update.before_value, "pending");
    assert_eq!(update.after_value, "done");
}

#[tokio::test]
async fn test_update_without_changes_logs_generic_save() {
    let app = create_test_app();
    let service = &app.state.record_service;
    let created = service.create(voc_draft("배송 문의"), &actor()).await.unwrap().record;

    let outcome = service
        .update(RecordKind::Voc, created.id(), patch(&[]), &actor())
        .await
        .unwrap();

    assert_eq!(outcome.logged, 1);
    let logs = app.change_logs.snapshot().await;
    assert_eq!(logs[1].changed_field, "일반 저장");
}

#[tokio::test]
async fn test_update_rejects_identity_change() {
    let app = create_test_app();
    let service = &app.state.record_service;
    let created = service.create(voc_draft("배송 문의"), &actor()).await.unwrap().record;

    let err = service
        .update(
            RecordKind::Voc,
            created.id(),
            patch(&[("code", json!("VOC-19990101-0001"))]),
            &actor(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(app.change_logs.snapshot().await.len(), 1);

    let stored = service.get(RecordKind::Voc, created.id()).await.unwrap();
    assert_eq!(stored.code(), created.code());
}

#[tokio::test]
async fn test_update_missing_record() {
    let app = create_test_app();

    let err = app
        .state
        .record_service
        .update(RecordKind::Voc, Uuid::new_v4(), patch(&[]), &actor())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_rejects_blank_title_or_team() {
    let app = create_test_app();
    let service = &app.state.record_service;
    let created = service.create(voc_draft("배송 문의"), &actor()).await.unwrap().record;

    for fields in [
        patch(&[("title", json!(""))]),
        patch(&[("team", json!(""))]),
        patch(&[("title", json!("")), ("team", json!(""))]),
    ] {
        let err = service
            .update(RecordKind::Voc, created.id(), fields, &actor())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    let stored = service.get(RecordKind::Voc, created.id()).await.unwrap();
    assert_eq!(stored.title(), "배송 문의");
    assert_eq!(stored.header().team, "고객지원팀");
    // 只有创建日志
    assert_eq!(app.change_logs.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_bulk_soft_delete_logs_each_record() {
    let app = create_test_app();
    let service = &app.state.record_service;

    let mut ids = Vec::new();
    for title in ["첫 번째", "두 번째", "세 번째"] {
        ids.push(service.create(voc_draft(title), &actor()).await.unwrap().record.id());
    }

    let outcome = service.soft_delete(RecordKind::Voc, &ids, &actor()).await.unwrap();
    assert_eq!(outcome.deleted.len(), 3);
    assert_eq!(outcome.logged, 3);

    let deletes: Vec<_> = app
        .change_logs
        .snapshot()
        .await
        .into_iter()
        .filter(|e| e.action == ChangeAction::Delete)
        .collect();
    assert_eq!(deletes.len(), 3);
    assert!(deletes.iter().all(|e| e.after_value.is_empty()));
    assert!(deletes.iter().all(|e| e.before_value == "pending"));

    // 软删除后默认列表为空，但记录仍然存在
    let page = service
        .list(RecordKind::Voc, &RecordFilter::default(), PageQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(app.records.list(RecordKind::Voc, true).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_soft_delete_repeated_id_logs_once() {
    let app = create_test_app();
    let service = &app.state.record_service;
    let record = service.create(voc_draft("중복 선택"), &actor()).await.unwrap().record;

    let outcome = service
        .soft_delete(RecordKind::Voc, &[record.id(), record.id()], &actor())
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![record.id()]);
    assert_eq!(outcome.logged, 1);

    let deletes: Vec<_> = app
        .change_logs
        .snapshot()
        .await
        .into_iter()
        .filter(|e| e.action == ChangeAction::Delete)
        .collect();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].code, record.code());

    let stored = app.records.get(RecordKind::Voc, record.id()).await.unwrap().unwrap();
    assert!(!stored.is_active());
}

#[tokio::test]
async fn test_soft_delete_partial_failure_logs_successes() {
    let app = create_test_app();
    let service = &app.state.record_service;
    let record = service.create(voc_draft("삭제 대상"), &actor()).await.unwrap().record;
    let unknown = Uuid::new_v4();

    let err = service
        .soft_delete(RecordKind::Voc, &[record.id(), unknown], &actor())
        .await
        .unwrap_err();

    match err {
        AppError::PartialFailure { failed_ids } => assert_eq!(failed_ids, vec![unknown]),
        other => panic!("unexpected error: {:?}", other),
    }

    let deletes = app
        .change_logs
        .snapshot()
        .await
        .into_iter()
        .filter(|e| e.action == ChangeAction::Delete)
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn test_failed_store_write_produces_no_log() {
    let records = Arc::new(FailingRecordStore::new());
    let change_logs = Arc::new(MemoryChangeLogStore::new());
    let state = create_test_app_state(records.clone(), change_logs.clone());
    let seeded = records.seed(voc_draft("기존 문의")).await;

    let err = state
        .record_service
        .create(voc_draft("새 문의"), &actor())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PersistenceFailed(_)));

    let err = state
        .record_service
        .update(
            RecordKind::Voc,
            seeded.id(),
            patch(&[("status", json!("done"))]),
            &actor(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PersistenceFailed(_)));

    let err = state
        .record_service
        .soft_delete(RecordKind::Voc, &[seeded.id()], &actor())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PersistenceFailed(_)));

    assert!(change_logs.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_log_failure_does_not_fail_save() {
    let records = Arc::new(MemoryRecordStore::new());
    let change_logs = Arc::new(FlakyChangeLogStore::new(&[0]));
    let state = create_test_app_state(records.clone(), change_logs.clone());

    let outcome = state
        .record_service
        .create(cost_draft("노트북 구매", 2_000_000), &actor())
        .await
        .unwrap();

    assert_eq!(outcome.logged, 0);
    assert_eq!(outcome.audit_failures, 1);
    assert!(records.get(RecordKind::Cost, outcome.record.id()).await.unwrap().is_some());
    assert!(change_logs.stored().await.is_empty());
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let app = create_test_app();
    let service = &app.state.record_service;

    for i in 1..=25 {
        let draft = cost_draft(&format!("비용 {}", i), i * 1000);
        let draft = if i % 5 == 0 {
            draft.with_status(RecordStatus::Done)
        } else {
            draft
        };
        service.create(draft, &actor()).await.unwrap();
    }

    let page = service
        .list(RecordKind::Cost, &RecordFilter::default(), PageQuery::new(2, 10))
        .await
        .unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].header().seq_no, 11);

    let done = RecordFilter {
        status: Some(RecordStatus::Done),
        ..Default::default()
    };
    let page = service
        .list(RecordKind::Cost, &done, PageQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 5);

    // 其他类型互不影响
    let page = service
        .list(RecordKind::Voc, &RecordFilter::default(), PageQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}
