//! Request validation and health checks that run without a database.
//!
//! Every request here is rejected, or answered, before a query is issued.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_create_hedgehog_requires_name() {
    let app = TestApp::new();

    let (status, body) = app
        .request(Method::POST, "/api/hedgehogs", Some(json!({"name": ""})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_create_weight_record_rejects_non_positive_weight() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/weight-records",
            Some(json!({"hedgehog_id": 1, "weight": 0})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("weight"));
}

#[tokio::test]
async fn test_create_therapy_rejects_inverted_dates() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/therapies",
            Some(json!({
                "hedgehog_id": 1,
                "name": "Antibiotic",
                "start_date": "2024-06-10T00:00:00Z",
                "end_date": "2024-06-01T00:00:00Z",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("end_date"));
}

#[tokio::test]
async fn test_create_area_rejects_zero_capacity() {
    let app = TestApp::new();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/areas",
            Some(json!({"name": "Box 1", "room_id": 1, "max_capacity": 0})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_hedgehog_status_filter_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/hedgehogs?status=escaped").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"]["connected"], false);
    assert_eq!(body["delivery"]["email_transport"], "console");
    assert_eq!(body["delivery"]["webhook_enabled"], false);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/api/notifications")
        .header("x-request-id", "req-123")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
