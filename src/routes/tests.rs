//! Router tests against an in-process fake backend that records every call.

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use super::build_router;
use crate::config::GatewayConfig;
use crate::state::AppState;

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    cache_control: Option<String>,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Seen>>>;

struct Harness {
    app: Router,
    log: Log,
}

impl Harness {
    fn calls(&self) -> Vec<Seen> {
        self.log.lock().unwrap().clone()
    }
}

fn review_42() -> Value {
    json!({
        "submission_id": 42,
        "review_markdown": "## 総評\n概ね良好です。",
        "review_json": {
            "strengths": [],
            "weaknesses": [],
            "important_points": [],
            "future_considerations": []
        },
        "answer_text": "第1 設問1",
        "subject": "憲法"
    })
}

fn review_13() -> Value {
    json!({
        "submission_id": 13,
        "review_markdown": "講評",
        "review_json": {
            "strengths": [{ "category": "論点", "description": "的確", "paragraph_numbers": [1, 3] }],
            "weaknesses": [{ "category": "あてはめ", "description": "薄い", "paragraph_numbers": [2] }],
            "important_points": [{ "paragraph_number": 3, "what_is_good": "規範", "what_is_lacking": "結論", "why_important": "配点" }]
        }
    })
}

fn dashboard_rows() -> Value {
    let row = |id: i64, entry_type: i32, status: i32, position: i32, deleted: Option<&str>| {
        json!({
            "id": id, "user_id": 1, "dashboard_date": "2026-10-17", "entry_type": entry_type,
            "subject": null, "item": format!("row {id}"), "due_date": null, "status": status,
            "memo": null, "position": position, "favorite": 0,
            "created_at": "2026-10-01", "updated_at": "2026-10-01", "deleted_at": deleted
        })
    };
    json!([row(1, 1, 3, 1, None), row(2, 2, 1, 0, Some("2026-10-10")), row(3, 2, 2, 0, None)])
}

async fn fake_backend(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    log.lock().unwrap().push(Seen {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_str(header::AUTHORIZATION),
        cache_control: header_str(header::CACHE_CONTROL),
        body: body.clone(),
    });

    match (method.as_str(), uri.path()) {
        ("GET", "/v1/admin/db/tables") => Json(json!(["users", "submissions"])).into_response(),
        ("POST", "/v1/chat") => Json(json!({ "reply": "回答です" })).into_response(),
        ("POST", "/v1/notes/pages") => {
            let sent: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (StatusCode::CREATED, Json(json!({ "id": 5, "title": sent["title"] }))).into_response()
        }
        ("GET", "/v1/official-questions/subjects") => Json(json!(["民法", "憲法", "商法", "特殊科目"])).into_response(),
        ("GET", "/v1/problems/years") => Json(json!([2023, 2024])).into_response(),
        ("GET", "/v1/problems/1") => Json(json!({
            "metadata": { "id": 1, "exam_type": "司法試験", "year": 2024, "subject": "民法" },
            "details": [{ "id": 10, "question_number": 1, "question_text": "設問1", "purpose": null }]
        }))
        .into_response(),
        ("GET", "/v1/review/42") => Json(review_42()).into_response(),
        ("GET", "/v1/review/13") => Json(review_13()).into_response(),
        ("GET", "/v1/review/7") => Json(json!({ "review_markdown": "no id" })).into_response(),
        ("GET", "/v1/review/404") => (StatusCode::NOT_FOUND, Json(json!({ "detail": "講評が見つかりません" }))).into_response(),
        ("GET", "/v1/review/502") => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        ("POST", "/v1/review") => Json(json!({
            "submission_id": 99,
            "review_markdown": "講評本文",
            "review_json": { "overall_review": { "score": 6.0 } },
            "answer_text": "答案"
        }))
        .into_response(),
        ("POST", "/v1/subscriptions/cancel") => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "Stripe API error" }))).into_response()
        }
        ("POST", "/v1/short-answer/sessions") => Json(json!({ "session_id": "s-1" })).into_response(),
        ("DELETE", p) if p.starts_with("/v1/study/tags/") => StatusCode::NO_CONTENT.into_response(),
        ("GET", "/v1/dashboard/items") => Json(dashboard_rows()).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response(),
    }
}

async fn harness() -> Harness {
    let log: Log = Arc::default();
    let backend = Router::new().fallback(fake_backend).with_state(log.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend).await.unwrap();
    });

    let config = GatewayConfig { backend_base_url: format!("http://{addr}"), ..GatewayConfig::default() };
    let state = Arc::new(AppState::new(config).unwrap());
    Harness { app: build_router(state), log }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str) -> axum::http::request::Builder {
    Request::post(uri).header(header::CONTENT_TYPE, "application/json")
}

#[tokio::test]
async fn health_is_local() {
    let h = harness().await;
    let (status, _, body) = send(&h.app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn note_page_without_authorization_is_401_without_backend_call() {
    let h = harness().await;
    let req = post_json("/api/notes/pages")
        .header(header::COOKIE, "access_token=cookie-token")
        .body(Body::from(r#"{"title":"憲法ノート"}"#))
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "認証が必要です" }));
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn note_page_forwards_authorization_verbatim() {
    let h = harness().await;
    let req = post_json("/api/notes/pages")
        .header(header::AUTHORIZATION, "Bearer header-token")
        .body(Body::from(r#"{"title":"憲法ノート"}"#))
        .unwrap();
    let (status, headers, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": 5, "title": "憲法ノート" }));
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");

    let calls = h.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::POST);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer header-token"));
    assert_eq!(calls[0].cache_control.as_deref(), Some("no-store"));
    let forwarded: Value = serde_json::from_slice(&calls[0].body).unwrap();
    assert_eq!(forwarded, json!({ "title": "憲法ノート" }));
}

#[tokio::test]
async fn admin_listing_uses_cookie_then_bearer_fallback() {
    let h = harness().await;

    let with_cookie = Request::get("/api/admin/db/tables")
        .header(header::COOKIE, "lang=ja; access_token=cookie-token")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, with_cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["users", "submissions"]));

    let with_header = Request::get("/api/admin/db/tables")
        .header(header::AUTHORIZATION, "Bearer header-token")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&h.app, with_header).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&h.app, get("/api/admin/db/tables")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "認証が必要です");

    let calls = h.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer cookie-token"));
    assert_eq!(calls[1].authorization.as_deref(), Some("Bearer header-token"));
}

#[tokio::test]
async fn chat_is_cookie_only() {
    let h = harness().await;
    let req = post_json("/api/chat")
        .header(header::AUTHORIZATION, "Bearer header-token")
        .body(Body::from(r#"{"message":"質問"}"#))
        .unwrap();
    let (status, _, _) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(h.calls().is_empty());

    let req = post_json("/api/chat")
        .header(header::COOKIE, "access_token=t")
        .body(Body::from(r#"{"message":"質問"}"#))
        .unwrap();
    let (status, headers, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "回答です" }));
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
}

#[tokio::test]
async fn cancel_subscription_propagates_backend_500_detail() {
    let h = harness().await;
    let req = Request::post("/api/subscriptions/cancel")
        .header(header::COOKIE, "access_token=t")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Stripe API error" }));

    let calls = h.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].body.is_empty());
}

#[tokio::test]
async fn subjects_are_ordered_and_only_declared_query_is_copied() {
    let h = harness().await;
    let (status, headers, body) =
        send(&h.app, get("/api/official-questions/subjects?exam_type=%E5%8F%B8%E6%B3%95%E8%A9%A6%E9%A8%93&debug=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["憲法", "民法", "商法", "特殊科目"]));
    assert!(headers.get(header::CACHE_CONTROL).is_none());

    let calls = h.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query.as_deref(), Some("exam_type=%E5%8F%B8%E6%B3%95%E8%A9%A6%E9%A8%93"));
    assert_eq!(calls[0].authorization, None);
}

#[tokio::test]
async fn absent_query_parameters_are_not_sent() {
    let h = harness().await;
    let (status, _, body) = send(&h.app, get("/api/problems/years?exam_type=")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([2023, 2024]));
    assert_eq!(h.calls()[0].query, None);
}

#[tokio::test]
async fn problem_detail_is_checked_and_echoed() {
    let h = harness().await;
    let (status, _, body) = send(&h.app, get("/api/problems/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["subject"], "民法");
    assert_eq!(body["details"][0]["question_number"], 1);
}

#[tokio::test]
async fn review_fetch_returns_envelope_unchanged() {
    let h = harness().await;
    let req = Request::get("/api/review/42").header(header::COOKIE, "access_token=t").body(Body::empty()).unwrap();
    let (status, headers, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, review_42());
    assert!(!body["review_markdown"].as_str().unwrap().is_empty());
    assert!(body["review_json"].is_object());
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
}

#[tokio::test]
async fn review_without_submission_id_is_a_500() {
    let h = harness().await;
    let req = Request::get("/api/review/7").header(header::COOKIE, "access_token=t").body(Body::empty()).unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn review_backend_errors_keep_status() {
    let h = harness().await;

    let req = Request::get("/api/review/404").header(header::COOKIE, "access_token=t").body(Body::empty()).unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "講評が見つかりません" }));

    let req = Request::get("/api/review/502").header(header::COOKIE, "access_token=t").body(Body::empty()).unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "講評の取得に失敗しました" }));
}

#[tokio::test]
async fn review_paragraph_annotations() {
    let h = harness().await;
    let req = Request::get("/api/review/13/paragraphs/3")
        .header(header::AUTHORIZATION, "Bearer t")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paragraph"], 3);
    assert_eq!(body["strengths"].as_array().unwrap().len(), 1);
    assert_eq!(body["weaknesses"].as_array().unwrap().len(), 0);
    assert_eq!(body["important_points"][0]["what_is_lacking"], "結論");

    let bad = Request::get("/api/review/13/paragraphs/abc")
        .header(header::AUTHORIZATION, "Bearer t")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&h.app, bad).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.calls().len(), 1);
}

#[tokio::test]
async fn review_submission_is_checked_before_forwarding() {
    let h = harness().await;

    let unauthenticated = post_json("/api/review").body(Body::from("not json")).unwrap();
    let (status, _, _) = send(&h.app, unauthenticated).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let missing_answer = post_json("/api/review")
        .header(header::COOKIE, "access_token=t")
        .body(Body::from(r#"{"subject":"民法"}"#))
        .unwrap();
    let (status, _, body) = send(&h.app, missing_answer).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert!(h.calls().is_empty());

    let sent = r#"{"problem_metadata_id":3,"subject":"民法","answer_text":"答案"}"#;
    let ok = post_json("/api/review")
        .header(header::COOKIE, "access_token=t")
        .body(Body::from(sent))
        .unwrap();
    let (status, _, body) = send(&h.app, ok).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submission_id"], 99);
    assert_eq!(body["review_markdown"], "講評本文");

    let calls = h.calls();
    assert_eq!(calls.len(), 1);
    let forwarded: Value = serde_json::from_slice(&calls[0].body).unwrap();
    assert_eq!(forwarded, serde_json::from_str::<Value>(sent).unwrap());
}

#[tokio::test]
async fn tag_delete_encodes_path_parameter() {
    let h = harness().await;
    let req = Request::delete("/api/study-tags/a%2Fb%20c")
        .header(header::AUTHORIZATION, "Bearer t")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let calls = h.calls();
    assert_eq!(calls[0].method, Method::DELETE);
    assert_eq!(calls[0].path, "/v1/study/tags/a%2Fb%20c");
}

#[tokio::test]
async fn short_answer_session_accepts_empty_body() {
    let h = harness().await;
    let req = Request::post("/api/short-answer/sessions")
        .header(header::COOKIE, "access_token=t")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "session_id": "s-1" }));
}

#[tokio::test]
async fn dashboard_hides_soft_deleted_items() {
    let h = harness().await;
    let req = Request::get("/api/dashboard/items?dashboard_date=2026-10-17")
        .header(header::COOKIE, "access_token=t")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    let ids: Vec<i64> = items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(items[0]["status_label"], "対応中");
    assert_eq!(items[1]["status_label"], "完了");
    assert_eq!(h.calls()[0].query.as_deref(), Some("dashboard_date=2026-10-17"));
}

#[tokio::test]
async fn logout_expires_session_cookie() {
    let h = harness().await;
    let req = Request::post("/api/auth/logout").body(Body::empty()).unwrap();
    let (status, headers, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("access_token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_a_500_with_message() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let config = GatewayConfig { backend_base_url: format!("http://{addr}"), ..GatewayConfig::default() };
    let app = build_router(Arc::new(AppState::new(config).unwrap()));
    let (status, _, body) = send(&app, get("/api/problems/years")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn undecodable_path_is_still_401_without_credential() {
    let h = harness().await;
    let req = Request::delete("/api/study-tags/%FF").body(Body::empty()).unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "認証が必要です" }));

    let req = Request::delete("/api/study-tags/%FF")
        .header(header::AUTHORIZATION, "Bearer t")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("リクエストの形式が不正です"));
    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn unknown_route_and_wrong_method_answer_with_error_envelope() {
    let h = harness().await;

    let (status, _, body) = send(&h.app, get("/api/chat")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "このメソッドは使用できません" }));

    let (status, _, body) = send(&h.app, get("/api/no-such-thing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "指定されたAPIは存在しません" }));

    assert!(h.calls().is_empty());
}

#[tokio::test]
async fn oversized_body_is_413_envelope_after_credential_check() {
    let h = harness().await;
    let huge = vec![b' '; 3 * 1024 * 1024];

    let req = post_json("/api/chat").body(Body::from(huge.clone())).unwrap();
    let (status, _, _) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = post_json("/api/chat")
        .header(header::COOKIE, "access_token=t")
        .body(Body::from(huge))
        .unwrap();
    let (status, _, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "リクエストボディが大きすぎます" }));
    assert!(h.calls().is_empty());
}
