use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use service::repository::{MemoryResourceRepository, ResourceRepository};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{build_router, AppState};

fn app(unique_title_per_owner: bool) -> Router {
    let repo: Arc<dyn ResourceRepository> = Arc::new(MemoryResourceRepository::new());
    build_router(AppState::new(repo, unique_title_per_owner), CorsLayer::very_permissive())
}

async fn send(app: &Router, method: &str, uri: &str, principal: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(p) = principal {
        req = req.header("x-principal-id", p.to_string());
    }
    let req = match body {
        Some(b) => req.header("content-type", "application/json").body(Body::from(b.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json body") };
    (status, value)
}

#[tokio::test]
async fn create_update_delete_lifecycle() {
    let app = app(false);
    let owner = Uuid::new_v4();

    let (status, body) = send(&app, "POST", "/api/projects", Some(owner), Some(json!({"title": "Launch", "budget": 500}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["title"], json!("Launch"));
    assert_eq!(body["data"]["budget"], json!(500));
    assert_eq!(body["data"]["status"], json!("active"));
    assert_eq!(body["data"]["owner"], json!(owner.to_string()));
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, body) = send(&app, "PATCH", &format!("/api/projects/{id}"), None, Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("completed"));
    assert_eq!(body["data"]["budget"], json!(500));

    let (status, body) = send(&app, "DELETE", &format!("/api/projects/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "GET", &format!("/api/projects/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Project not found"}));
}

#[tokio::test]
async fn invalid_payload_reports_every_field_and_persists_nothing() {
    let app = app(false);
    let owner = Uuid::new_v4();
    let (status, body) = send(&app, "POST", "/api/projects", Some(owner), Some(json!({"title": "", "budget": -5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Validation failed",
            "details": [
                {"field": "title", "reason": "required"},
                {"field": "budget", "reason": "range"}
            ]
        })
    );

    let (status, body) = send(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(0));
}

#[tokio::test]
async fn create_requires_a_valid_principal() {
    let app = app(false);
    let payload = json!({"title": "Launch", "budget": 1});

    let (status, body) = send(&app, "POST", "/api/projects", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!([{"field": "owner", "reason": "required"}]));

    let req = Request::builder()
        .method("POST")
        .uri("/api/projects")
        .header("x-principal-id", "not-a-uuid")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["details"], json!([{"field": "owner", "reason": "format"}]));
}

#[tokio::test]
async fn duplicate_title_conflicts_when_uniqueness_is_enabled() {
    let app = app(true);
    let owner = Uuid::new_v4();
    let payload = json!({"title": "Launch", "budget": 1});

    let (status, _) = send(&app, "POST", "/api/projects", Some(owner), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/api/projects", Some(owner), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Project already exists"));

    // another owner may reuse the title
    let (status, _) = send(&app, "POST", "/api/projects", Some(Uuid::new_v4()), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn malformed_ids_and_bodies_are_bad_requests() {
    let app = app(false);
    let (status, body) = send(&app, "GET", "/api/projects/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let req = Request::builder()
        .method("POST")
        .uri("/api/projects")
        .header("x-principal-id", Uuid::new_v4().to_string())
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_ids_are_not_found_for_every_operation() {
    let app = app(false);
    let uri = format!("/api/projects/{}", Uuid::new_v4());
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", &uri, None, Some(json!({"budget": 3}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_owner_and_orders_newest_first() {
    let app = app(false);
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    for title in ["first", "second", "third"] {
        let (status, _) = send(&app, "POST", "/api/projects", Some(alice), Some(json!({"title": title, "budget": 1}))).await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    send(&app, "POST", "/api/projects", Some(bob), Some(json!({"title": "other", "budget": 1}))).await;

    let (status, body) = send(&app, "GET", &format!("/api/projects?owner={alice}&per_page=2"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(3));
    let titles: Vec<&str> = body["data"]["items"].as_array().expect("items").iter().filter_map(|p| p["title"].as_str()).collect();
    assert_eq!(titles, vec!["third", "second"]);

    let (status, body) = send(&app, "GET", "/api/projects?sort=title", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!([{"field": "sort", "reason": "enum"}]));
}

#[tokio::test]
async fn health_metrics_and_docs_are_served() {
    let app = app(false);
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    send(&app, "POST", "/api/projects", Some(Uuid::new_v4()), Some(json!({"title": "m", "budget": 1}))).await;
    let req = Request::builder().uri("/metrics").body(Body::empty()).expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await.expect("body").to_vec()).expect("utf8");
    assert!(text.contains("resource_operations_total"));

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/projects"].is_object());
}

#[tokio::test]
async fn missing_principal_is_reported_with_payload_errors() {
    let app = app(false);
    let (status, body) = send(&app, "POST", "/api/projects", None, Some(json!({"title": "", "budget": -5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!([
            {"field": "owner", "reason": "required"},
            {"field": "title", "reason": "required"},
            {"field": "budget", "reason": "range"}
        ])
    );

    let (_, body) = send(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(body["data"]["total"], json!(0));
}

#[tokio::test]
async fn unknown_status_filter_is_rejected() {
    let app = app(false);
    let (status, body) = send(&app, "GET", "/api/projects?status=bogus", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!([{"field": "status", "reason": "enum"}]));

    let (status, _) = send(&app, "GET", "/api/projects?status=archived", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
