//! Integration tests for the notification endpoints.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{notification, test_now, TestApp};
use domain::models::{NotificationPriority, NotificationType};
use rescue_api::services::SweepScope;

fn seed(app: &TestApp) {
    let now = test_now();
    app.store.add_notification(notification(
        1,
        NotificationType::WeightStagnation,
        NotificationPriority::Medium,
        now - Duration::hours(3),
    ));
    app.store.add_notification(notification(
        2,
        NotificationType::WeightDrop,
        NotificationPriority::Critical,
        now - Duration::hours(5),
    ));
    app.store.add_notification(notification(
        3,
        NotificationType::TherapyExpired,
        NotificationPriority::High,
        now - Duration::hours(1),
    ));
    app.store.add_notification(notification(
        4,
        NotificationType::WeightStagnation,
        NotificationPriority::Medium,
        now - Duration::hours(2),
    ));
}

fn ids(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_orders_by_priority_then_recency() {
    let app = TestApp::new();
    seed(&app);

    let (status, body) = app.get("/api/notifications").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2, 3, 4, 1]);
}

#[tokio::test]
async fn test_list_filters() {
    let app = TestApp::new();
    seed(&app);

    let (_, body) = app.get("/api/notifications?type=weight_stagnation").await;
    assert_eq!(ids(&body), vec![4, 1]);

    let (_, body) = app.get("/api/notifications?priority=critical").await;
    assert_eq!(ids(&body), vec![2]);

    let (_, body) = app.get("/api/notifications?limit=2").await;
    assert_eq!(ids(&body), vec![2, 3]);
}

#[tokio::test]
async fn test_mark_read_and_unread_filter() {
    let app = TestApp::new();
    seed(&app);

    let (status, body) = app.put("/api/notifications/3/read", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 3);
    assert_eq!(body["read"], true);

    let (_, body) = app.get("/api/notifications?unread=true").await;
    assert_eq!(ids(&body), vec![2, 4, 1]);

    let (_, body) = app.get("/api/notifications?unread=false").await;
    assert_eq!(ids(&body).len(), 4);
}

#[tokio::test]
async fn test_mark_read_missing_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.put("/api/notifications/99/read", serde_json::json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_dismissed_notification_is_hidden() {
    let app = TestApp::new();
    seed(&app);

    let (status, _) = app.delete("/api/notifications/2").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get("/api/notifications").await;
    assert!(!ids(&body).contains(&2));

    let (_, body) = app.get("/api/notifications?priority=critical").await;
    assert!(ids(&body).is_empty());

    // Still stored, only flagged
    assert!(app.store.notifications().iter().any(|n| n.id == 2 && n.dismissed));
}

#[tokio::test]
async fn test_dismiss_missing_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.delete("/api/notifications/42").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_skip_dismissed() {
    let app = TestApp::new();
    seed(&app);
    app.delete("/api/notifications/1").await;
    app.put("/api/notifications/4/read", serde_json::json!({})).await;

    let (status, body) = app.get("/api/notifications/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["unread"], 2);
    assert_eq!(body["critical"], 1);
    assert_eq!(body["high"], 1);
    assert_eq!(body["by_type"]["weight_stagnation"], 1);
    assert_eq!(body["by_type"]["weight_drop"], 1);
}

#[tokio::test]
async fn test_analytics_counts_recent_creation() {
    let app = TestApp::new();
    seed(&app);
    app.store.add_notification(notification(
        5,
        NotificationType::NoWeighing,
        NotificationPriority::Medium,
        test_now() - Duration::days(3),
    ));

    let (status, body) = app.get("/api/notifications/analytics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_24_hours"], 4);
    assert_eq!(body["last_week"], 5);
    assert_eq!(body["trend_data"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_check_queues_full_sweep() {
    let mut app = TestApp::new();

    let (status, body) = app.post("/api/notifications/check").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].as_str().unwrap().contains("started"));
    assert_eq!(app.rechecks.recv().await, Some(SweepScope::Full));
}

#[tokio::test]
async fn test_check_rejected_when_queue_full() {
    let mut config = common::test_config();
    config.notifications.recheck_queue_capacity = 1;
    let app = TestApp::with_config(config);

    let (first, _) = app.post("/api/notifications/check").await;
    let (second, body) = app.post("/api/notifications/check").await;

    assert_eq!(first, StatusCode::ACCEPTED);
    assert_eq!(second, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}

#[tokio::test]
async fn test_summary_returns_immediately() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/notifications/summary").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Daily summary started");
}
