// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Router tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tower::ServiceExt;

static MAP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

const PASSWORD: &str = "walking42";
const BOUNDARY: &str = "territory-test-boundary";

/// Helper to create test app state with in-memory persistence and a fresh
/// map directory.
fn create_test_app_state() -> AppState {
    let persistence: Persistence = Persistence::new_in_memory()
        .expect("Failed to create in-memory persistence")
        .with_password_cost(4);

    let maps_dir: PathBuf = std::env::temp_dir().join(format!(
        "territory-server-maps-{}-{}",
        std::process::id(),
        MAP_DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::create_dir_all(&maps_dir).unwrap();

    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        broadcaster: Arc::new(LiveEventBroadcaster::new()),
        map_store: Arc::new(MapStore::new(maps_dir)),
        policy: AssignmentPolicy::default(),
        session_ttl: DEFAULT_SESSION_TTL,
    }
}

fn create_test_router(app_state: &AppState) -> Router {
    build_router(app_state.clone(), 1024 * 1024)
}

async fn read_json(response: Response) -> Value {
    let bytes: Bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends one request and returns the status and JSON body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (HttpStatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request: Request<Body> = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response: Response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    (status, read_json(response).await)
}

/// Signs up and logs in, returning the session token.
async fn sign_up_and_login(app: &Router, email: &str, name: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({
            "email": email,
            "display_name": name,
            "password": PASSWORD,
            "password_confirmation": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    body["session_token"].as_str().unwrap().to_string()
}

/// Signs up an administrator and a publisher.
async fn seed_accounts(app: &Router) -> (String, String) {
    let admin: String = sign_up_and_login(app, "admin@example.org", "Admin").await;
    let publisher: String = sign_up_and_login(app, "ana@example.org", "Ana").await;
    (admin, publisher)
}

async fn create_link_territory(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/territories",
        Some(token),
        Some(json!({
            "name": name,
            "map_url": format!("https://maps.example.org/{name}.pdf"),
        })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CREATED);
    body["territory"]["territory_id"].as_i64().unwrap()
}

fn multipart_body(name: &str, file_name: &str, contents: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"name\"\r\n\r\n\
         {name}\r\n\
         --{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

async fn upload(app: &Router, token: &str, name: &str, file_name: &str) -> Response {
    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/territories/upload")
        .header("Authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(name, file_name, "MAPDATA")))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["message"], "ok");
}

#[tokio::test]
async fn test_first_account_is_admin_via_whoami() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, publisher) = seed_accounts(&app).await;

    let (status, body) = send(&app, "GET", "/auth/whoami", Some(&admin), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["capabilities"]["can_manage_users"], true);

    let (_, body) = send(&app, "GET", "/auth/whoami", Some(&publisher), None).await;
    assert_eq!(body["role"], "publisher");
    assert_eq!(body["capabilities"]["can_manage_users"], false);
}

#[tokio::test]
async fn test_requests_without_valid_session_are_unauthorized() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);

    let (status, body) = send(&app, "GET", "/territories", None, None).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);

    let (status, _) = send(&app, "GET", "/territories", Some("not-a-token"), None).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    seed_accounts(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.org", "password": "nope-nope1" })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (_admin, publisher) = seed_accounts(&app).await;

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, _) = send(&app, "GET", "/me", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_publisher_cannot_manage_territories() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (_admin, publisher) = seed_accounts(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/territories",
        Some(&publisher),
        Some(json!({ "name": "Centro 1", "map_url": "https://maps.example.org/c1.pdf" })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/statistics", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_territory_is_not_found() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, _publisher) = seed_accounts(&app).await;

    let (status, _) = send(&app, "GET", "/territories/999", Some(&admin), None).await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_assign_report_lifecycle() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, publisher) = seed_accounts(&app).await;
    let territory_id: i64 = create_link_territory(&app, &admin, "Centro 1").await;

    let (status, body) = send(&app, "POST", "/requests", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::CREATED);
    let request_id: i64 = body["request"]["request_id"].as_i64().unwrap();

    let (status, _) = send(&app, "POST", "/requests", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, "GET", "/requests", Some(&admin), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/requests/{request_id}/assign"),
        Some(&admin),
        Some(json!({ "territory_id": territory_id })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["territory"]["status"], "in_use");
    assert_eq!(body["request"]["status"], "approved");

    let (status, body) = send(&app, "GET", "/me", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["active_territory"]["territory_id"], territory_id);
    assert_eq!(body["active_territory"]["assignment"]["days_remaining"], 30);
    assert_eq!(body["unread_notifications"], 1);

    let (status, body) = send(&app, "POST", "/requests", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], true);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/territories/{territory_id}/report"),
        Some(&publisher),
        Some(json!({ "notes": "All done" })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["territory"]["status"], "available");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/territories/{territory_id}/history"),
        Some(&publisher),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["entries"][0]["user_name"], "Ana");
    assert_eq!(body["entries"][0]["notes"], "All done");
}

#[tokio::test]
async fn test_mark_notifications_read() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, publisher) = seed_accounts(&app).await;
    let territory_id: i64 = create_link_territory(&app, &admin, "Centro 1").await;

    let (_, body) = send(&app, "POST", "/requests", Some(&publisher), None).await;
    let request_id: i64 = body["request"]["request_id"].as_i64().unwrap();
    send(
        &app,
        "POST",
        &format!("/requests/{request_id}/assign"),
        Some(&admin),
        Some(json!({ "territory_id": territory_id })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/notifications", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["unread_count"], 1);
    assert_eq!(body["notifications"][0]["kind"], "success");

    let (status, body) = send(
        &app,
        "POST",
        "/notifications/read",
        Some(&publisher),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["updated"], 1);
    assert_eq!(body["unread_count"], 0);
}

#[tokio::test]
async fn test_role_change_rules() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, publisher) = seed_accounts(&app).await;

    let (_, me) = send(&app, "GET", "/auth/whoami", Some(&admin), None).await;
    let admin_id: i64 = me["user_id"].as_i64().unwrap();
    let (_, them) = send(&app, "GET", "/auth/whoami", Some(&publisher), None).await;
    let publisher_id: i64 = them["user_id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/users/{admin_id}/role"),
        Some(&admin),
        Some(json!({ "role": "publisher" })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/users/{publisher_id}/role"),
        Some(&admin),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, body) = send(&app, "GET", "/users", Some(&publisher), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_serve_and_delete_map() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, _publisher) = seed_accounts(&app).await;

    let response: Response = upload(&app, &admin, "Centro 1", "centro 1.png").await;
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    let body: Value = read_json(response).await;
    let territory_id: i64 = body["territory"]["territory_id"].as_i64().unwrap();
    let map_url: String = body["territory"]["map_url"].as_str().unwrap().to_string();
    assert!(map_url.starts_with("/maps/"));
    assert!(map_url.ends_with("_centro_1.png"));

    let map: Response = app
        .clone()
        .oneshot(Request::builder().uri(&map_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(map.status(), HttpStatusCode::OK);
    assert_eq!(map.headers()[header::CONTENT_TYPE], "image/png");
    let bytes: Bytes = axum::body::to_bytes(map.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"MAPDATA");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/territories/{territory_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert!(body["stored_map_file"].as_str().unwrap().ends_with("_centro_1.png"));

    let (status, _) = send(&app, "GET", &map_url, None, None).await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_file_type() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, _publisher) = seed_accounts(&app).await;

    let response: Response = upload(&app, &admin, "Centro 1", "centro.exe").await;

    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    let stored: usize = std::fs::read_dir(app_state.map_store.root())
        .unwrap()
        .count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_mutations_are_broadcast() {
    let app_state: AppState = create_test_app_state();
    let app: Router = create_test_router(&app_state);
    let (admin, _publisher) = seed_accounts(&app).await;
    let mut rx: broadcast::Receiver<LiveEvent> = app_state.broadcaster.subscribe();

    let territory_id: i64 = create_link_territory(&app, &admin, "Centro 1").await;

    assert_eq!(
        rx.try_recv().ok(),
        Some(LiveEvent::TerritoryCreated { territory_id })
    );
}
