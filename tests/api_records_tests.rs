//! 记录与变更日志 API 集成测试

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::create_test_app;

fn router() -> Router {
    backoffice_system::routes::create_router(create_test_app().state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-acting-user", HeaderValue::from_bytes("홍길동".as_bytes()).unwrap())
        .header("x-acting-team", "고객지원팀".as_bytes());

    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

fn voc_body(title: &str) -> Value {
    json!({
        "title": title,
        "team": "고객지원팀",
        "customer": "ACME",
        "channel": "phone"
    })
}

#[tokio::test]
async fn test_create_update_and_history() {
    let app = router();

    let (status, created) = send(&app, Method::POST, "/api/v1/records/voc", Some(voc_body("배송 문의"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["logged"], 1);
    assert_eq!(created["record"]["kind"], "voc");
    let id = created["record"]["id"].as_str().unwrap().to_string();
    let code = created["record"]["code"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/records/voc/{}", id),
        Some(json!({ "status": "in_progress", "assignee": "김철수" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["logged"], 2);
    assert_eq!(updated["record"]["status"], "in_progress");

    let (status, history) = send(
        &app,
        Method::GET,
        &format!("/api/v1/records/voc/history/{}", code),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["count"], 3);

    let logs = history["logs"].as_array().unwrap();
    // 最新的在前
    assert_eq!(logs[2]["action"], "생성");
    assert_eq!(logs[2]["changedField"], "-");
    assert_eq!(logs[0]["action"], "수정");
    assert_eq!(logs[0]["user"], "홍길동");
    assert_eq!(logs[0]["team"], "고객지원팀");
}

#[tokio::test]
async fn test_get_and_list_records() {
    let app = router();

    for title in ["첫 번째", "두 번째", "세 번째"] {
        let (status, _) = send(&app, Method::POST, "/api/v1/records/voc", Some(voc_body(title))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(&app, Method::GET, "/api/v1/records/voc?page=1&page_size=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let id = page["items"][0]["id"].as_str().unwrap().to_string();
    let (status, record) = send(&app, Method::GET, &format!("/api/v1/records/voc/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["title"], "첫 번째");

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/v1/records/voc?search=%EB%91%90",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = router();

    let (status, body) = send(&app, Method::POST, "/api/v1/records/voc", Some(voc_body(""))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    // 缺少类型专有字段
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/records/voc",
        Some(json!({ "title": "채널 없음", "team": "고객지원팀" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/records/payroll", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_code_is_rejected() {
    let app = router();

    let (status, body) = send(&app, Method::GET, "/api/v1/records/voc/history/not-a-code", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("not-a-code"));

    let (status, _) = send(&app, Method::GET, "/api/v1/change-logs?code=VOC-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/change-logs?code=VOC-20240301-0001",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_update_rejects_code_change() {
    let app = router();
    let (_, created) = send(&app, Method::POST, "/api/v1/records/voc", Some(voc_body("배송 문의"))).await;
    let id = created["record"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/records/voc/{}", id),
        Some(json!({ "code": "VOC-19990101-0001" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("code"));
}

#[tokio::test]
async fn test_bulk_delete_with_partial_failure() {
    let app = router();
    let (_, first) = send(&app, Method::POST, "/api/v1/records/voc", Some(voc_body("하나"))).await;
    let (_, second) = send(&app, Method::POST, "/api/v1/records/voc", Some(voc_body("둘"))).await;
    let ids = vec![
        first["record"]["id"].clone(),
        second["record"]["id"].clone(),
    ];

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/records/voc/delete",
        Some(json!({ "ids": ids })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logged"], 2);

    // 再次删除：全部已停用
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/records/voc/delete",
        Some(json!({ "ids": [ids[0].clone()] })),
    )
    .await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["error"]["failed_ids"][0], ids[0]);

    let (_, logs) = send(&app, Method::GET, "/api/v1/change-logs?action=delete", None).await;
    assert_eq!(logs["total"], 2);
}

#[tokio::test]
async fn test_change_log_filters_and_paging() {
    let app = router();
    send(&app, Method::POST, "/api/v1/records/voc", Some(voc_body("배송 문의"))).await;
    send(
        &app,
        Method::POST,
        "/api/v1/records/cost",
        Some(json!({
            "title": "서버 증설",
            "team": "재무팀",
            "category": "하드웨어",
            "amount": 1500000
        })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/v1/change-logs?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 2);
    assert!(body["logs"][0]["description"]
        .as_str()
        .unwrap()
        .starts_with("비용 관리 서버 증설(COST-"));

    let (_, body) = send(&app, Method::GET, "/api/v1/change-logs?entity_kind=voc", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["logs"][0]["title"], "배송 문의");
}

#[tokio::test]
async fn test_field_labels() {
    let app = router();

    let (status, body) = send(&app, Method::GET, "/api/v1/field-labels/cost", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_label"], "비용 관리");

    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields[0]["key"], "title");
    assert_eq!(fields[1]["label"], "상태");
    assert!(fields.iter().any(|f| f["key"] == "amount" && f["kind"] == "amount"));
}

#[tokio::test]
async fn test_change_log_stream_headers() {
    let app = router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/stream/change-logs?kind=voc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
}
