//! End-to-end tests for the HTTP interface
//!
//! Each test drives the full router, middleware included, against a fresh
//! in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shutdown_manager::api::{self, AppState};
use shutdown_manager::config::Settings;
use shutdown_manager::infrastructure::Database;
use tower::ServiceExt;

const BOUNDARY: &str = "shutdown-manager-test-boundary";

async fn test_router() -> Router {
    let database = Database::in_memory()
        .await
        .expect("in-memory database should open");
    let settings = Settings::new().expect("default settings should load");
    api::router(AppState::new(database), &settings)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A multipart body with one `file` part
fn multipart_body(file_name: &str, contents: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

fn upload(uri: &str, file_name: &str, contents: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(file_name, contents)))
        .unwrap()
}

/// A multipart body whose only part is not named `file`
fn upload_without_file(uri: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         nothing here\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn create_app(router: &Router, name: &str) -> i64 {
    let response = send(
        router,
        json_request(
            Method::POST,
            "/api/applications",
            json!({ "name": name, "owner": "Platform" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn application_list(router: &Router) -> Vec<Value> {
    let response = send(router, get("/api/applications")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await.as_array().unwrap().clone()
}

#[tokio::test]
async fn test_health_check_reports_ok() {
    let router = test_router().await;
    let response = send(&router, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let router = test_router().await;
    let request_id = "0191f7c2-8a3e-7000-8000-000000000001";
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", request_id)
        .body(Body::empty())
        .unwrap();

    let response = send(&router, request).await;
    assert_eq!(response.headers()["x-request-id"], request_id);
}

#[tokio::test]
async fn test_empty_inventory_lists_nothing() {
    let router = test_router().await;
    assert!(application_list(&router).await.is_empty());

    let response = send(&router, get("/api/servers")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_create_application_applies_defaults() {
    let router = test_router().await;
    let response = send(
        &router,
        json_request(
            Method::POST,
            "/api/applications",
            json!({
                "name": "Billing",
                "owner": "Finance",
                "web_ui": "https://billing.internal",
                "db_port": 5432
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["message"], "Application created successfully");
    let id = created["id"].as_i64().unwrap();

    let apps = application_list(&router).await;
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0]["id"], id);
    assert_eq!(apps[0]["name"], "Billing");
    assert_eq!(apps[0]["db_port"], 5432);
    assert_eq!(apps[0]["status"], "active");
    assert_eq!(apps[0]["shutdown_verified"], false);
    assert_eq!(apps[0]["servers"], json!([]));
}

#[tokio::test]
async fn test_create_application_without_owner_is_rejected() {
    let router = test_router().await;
    let response = send(
        &router,
        json_request(Method::POST, "/api/applications", json!({ "name": "Billing" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["error"].as_str().unwrap().contains("owner"));
    assert!(application_list(&router).await.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let router = test_router().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/applications")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "FORMAT_ERROR");
}

#[tokio::test]
async fn test_update_application_changes_only_given_fields() {
    let router = test_router().await;
    let id = create_app(&router, "Billing").await;

    let response = send(
        &router,
        json_request(
            Method::PUT,
            &format!("/api/applications/{id}"),
            json!({ "shutdown_verified": true }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Application updated successfully"
    );

    let apps = application_list(&router).await;
    assert_eq!(apps[0]["shutdown_verified"], true);
    assert_eq!(apps[0]["status"], "active");

    let response = send(
        &router,
        json_request(
            Method::PUT,
            &format!("/api/applications/{id}"),
            json!({ "status": "decommissioned" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let apps = application_list(&router).await;
    assert_eq!(apps[0]["status"], "decommissioned");
    assert_eq!(apps[0]["shutdown_verified"], true);
}

#[tokio::test]
async fn test_update_with_non_numeric_id_is_a_json_bad_request() {
    let router = test_router().await;
    let response = send(
        &router,
        json_request(
            Method::PUT,
            "/api/applications/abc",
            json!({ "status": "retired" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["code"], "FORMAT_ERROR");
    assert!(error["error"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_update_unknown_application_is_not_found() {
    let router = test_router().await;
    let response = send(
        &router,
        json_request(
            Method::PUT,
            "/api/applications/999",
            json!({ "status": "retired" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_servers_are_nested_under_their_application() {
    let router = test_router().await;
    let app_id = create_app(&router, "Billing").await;

    let response = send(
        &router,
        json_request(
            Method::POST,
            "/api/servers",
            json!({ "hostname": "web-01", "ip_address": "10.0.0.1", "app_id": app_id }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["message"], "Server created successfully");
    let server_id = created["id"].as_i64().unwrap();

    let response = send(&router, get("/api/servers")).await;
    let servers = body_json(response).await;
    assert_eq!(servers[0]["id"], server_id);
    assert_eq!(servers[0]["ping_status"], true);
    assert_eq!(servers[0]["app_id"], app_id);

    let apps = application_list(&router).await;
    assert_eq!(apps[0]["servers"][0]["hostname"], "web-01");
}

#[tokio::test]
async fn test_server_for_unknown_application_is_not_found() {
    let router = test_router().await;
    let response = send(
        &router,
        json_request(
            Method::POST,
            "/api/servers",
            json!({ "hostname": "web-01", "ip_address": "10.0.0.1", "app_id": 41 }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(&router, get("/api/servers")).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_server_with_overlong_ip_is_rejected() {
    let router = test_router().await;
    let app_id = create_app(&router, "Billing").await;
    let response = send(
        &router,
        json_request(
            Method::POST,
            "/api/servers",
            json!({ "hostname": "web-01", "ip_address": "192.168.100.1000", "app_id": app_id }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_templates_are_csv_attachments() {
    let router = test_router().await;

    for (uri, file_name, header_row) in [
        (
            "/api/applications/template",
            "applications_template.csv",
            "name,owner,web_ui,db_port",
        ),
        (
            "/api/servers/template",
            "servers_template.csv",
            "hostname,ip_address,app_id",
        ),
    ] {
        let response = send(&router, get(uri)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains(file_name));

        let text = body_text(response).await;
        assert_eq!(text.lines().next(), Some(header_row));
        assert_eq!(text.lines().count(), 1);
    }
}

#[tokio::test]
async fn test_application_import_persists_every_row() {
    let router = test_router().await;
    let csv = "name,owner,web_ui,db_port\n\
               Billing,Finance,https://billing.internal,5432\n\
               Payroll,HR,,\n";

    let response = send(&router, upload("/api/applications/import", "apps.csv", csv)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["message"], "Imported 2 application(s) successfully");
    assert_eq!(report["imported"], 2);

    let apps = application_list(&router).await;
    let names: Vec<_> = apps.iter().map(|app| app["name"].clone()).collect();
    assert_eq!(names, vec![json!("Billing"), json!("Payroll")]);
}

#[tokio::test]
async fn test_application_import_with_bad_row_persists_nothing() {
    let router = test_router().await;
    let csv = "name,owner\nA,Team\nB,Team\nC,\n";

    let response = send(&router, upload("/api/applications/import", "apps.csv", csv)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().starts_with("Row 3"));
    assert_eq!(error["details"]["row"], 3);
    assert_eq!(error["details"]["rolled_back"], true);
    assert!(application_list(&router).await.is_empty());
}

#[tokio::test]
async fn test_server_import_round_trips_its_template() {
    let router = test_router().await;
    let app_id = create_app(&router, "Billing").await;
    let csv = format!(
        "hostname,ip_address,app_id\nweb-01,10.0.0.1,{app_id}\nweb-02,10.0.0.2,{app_id}\n"
    );

    let response = send(&router, upload("/api/servers/import", "SERVERS.CSV", &csv)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Imported 2 server(s) successfully"
    );

    let apps = application_list(&router).await;
    assert_eq!(apps[0]["servers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_server_import_with_non_numeric_app_id_persists_nothing() {
    let router = test_router().await;
    let app_id = create_app(&router, "Billing").await;
    let csv = format!(
        "hostname,ip_address,app_id\nweb-01,10.0.0.1,{app_id}\nweb-02,10.0.0.2,abc\n"
    );

    let response = send(&router, upload("/api/servers/import", "servers.csv", &csv)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"]["row"], 2);

    let response = send(&router, get("/api/servers")).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_server_import_for_unknown_application_persists_nothing() {
    let router = test_router().await;
    let app_id = create_app(&router, "Billing").await;
    let csv = format!(
        "hostname,ip_address,app_id\nweb-01,10.0.0.1,{app_id}\nweb-02,10.0.0.2,9999\n"
    );

    let response = send(&router, upload("/api/servers/import", "servers.csv", &csv)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&router, get("/api/servers")).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_import_rejects_non_csv_file_names() {
    let router = test_router().await;
    let response = send(
        &router,
        upload("/api/applications/import", "apps.txt", "name,owner\nA,B\n"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid format: File must be a CSV");
    assert!(application_list(&router).await.is_empty());
}

#[tokio::test]
async fn test_import_without_file_part_is_rejected() {
    let router = test_router().await;

    let response = send(&router, upload_without_file("/api/applications/import")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid format: No file provided");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/servers/import")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_routes_are_not_found() {
    let router = test_router().await;
    let response = send(&router, get("/api/nothing-here")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_upload_is_refused() {
    let database = Database::in_memory().await.unwrap();
    let mut settings = Settings::new().unwrap();
    settings.import.max_upload_bytes = 64;
    let router = api::router(AppState::new(database), &settings);

    let csv = format!("name,owner\n{}", "Billing,Finance\n".repeat(20));
    let mut request = upload("/api/applications/import", "apps.csv", &csv);
    let length = multipart_body("apps.csv", &csv).len();
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, length.into());

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(application_list(&router).await.is_empty());
}

#[tokio::test]
async fn test_oversized_streamed_upload_is_refused() {
    let database = Database::in_memory().await.unwrap();
    let mut settings = Settings::new().unwrap();
    settings.import.max_upload_bytes = 64;
    let router = api::router(AppState::new(database), &settings);

    let csv = format!("name,owner\n{}", "Billing,Finance\n".repeat(20));
    let request = upload("/api/applications/import", "apps.csv", &csv);
    assert!(!request.headers().contains_key(header::CONTENT_LENGTH));

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");
    assert!(application_list(&router).await.is_empty());
}
