//! Integration tests against a real PostgreSQL database.
//!
//! Set `TEST_DATABASE_URL` to run them; without it every test returns early.
//! Each test works on its own hedgehog so the suite can share one database.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Duration, Utc};
use common::{cleanup_notifications, test_now, test_pool, TestApp};
use domain::models::{NewNotification, NotificationPriority, NotificationQuery, NotificationType};
use domain::services::NotificationStore;
use persistence::repositories::{HedgehogRepository, NewHedgehog, NotificationRepository};
use rescue_api::services::SweepScope;
use serde_json::json;
use sqlx::PgPool;

async fn create_hedgehog_via_api(app: &TestApp) -> i64 {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/hedgehogs",
            Some(json!({"name": "Spike"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_hedgehog(pool: &PgPool) -> i64 {
    HedgehogRepository::new(pool.clone())
        .create(NewHedgehog {
            name: "Bramble",
            description: "",
            arrival_date: test_now() - Duration::days(30),
            status: "in_care",
            release_date: None,
            area_id: None,
        })
        .await
        .expect("Failed to create hedgehog")
        .id
}

fn alert(
    hedgehog_id: i64,
    notification_type: NotificationType,
    priority: NotificationPriority,
) -> NewNotification {
    let mut n = NewNotification::delivery_test("test");
    n.notification_type = notification_type;
    n.priority = priority;
    n.hedgehog_id = Some(hedgehog_id);
    n
}

async fn exists(pool: &PgPool, id: i64) -> bool {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM notifications WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to query notification")
}

// ============================================================================
// Write-triggered rechecks
// ============================================================================

#[tokio::test]
async fn test_create_weight_record_queues_weight_recheck() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let mut app = TestApp::with_pool(pool);
    let hedgehog_id = create_hedgehog_via_api(&app).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/weight-records",
            Some(json!({"hedgehog_id": hedgehog_id, "weight": 512.5})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["weight"], 512.5);
    assert_eq!(app.rechecks.try_recv().ok(), Some(SweepScope::Weight));
    assert!(app.rechecks.try_recv().is_err());
}

#[tokio::test]
async fn test_therapy_writes_queue_therapy_rechecks() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let mut app = TestApp::with_pool(pool);
    let hedgehog_id = create_hedgehog_via_api(&app).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/therapies",
            Some(json!({"hedgehog_id": hedgehog_id, "name": "Antibiotic"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.rechecks.try_recv().ok(), Some(SweepScope::Therapy));

    let therapy_id = body["id"].as_i64().unwrap();
    let (status, body) = app
        .put(
            &format!("/api/therapies/{}", therapy_id),
            json!({"description": "Twice daily"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Twice daily");
    assert_eq!(app.rechecks.try_recv().ok(), Some(SweepScope::Therapy));
    assert!(app.rechecks.try_recv().is_err());
}

#[tokio::test]
async fn test_update_hedgehog_queues_missing_weighing_recheck() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let mut app = TestApp::with_pool(pool);
    let hedgehog_id = create_hedgehog_via_api(&app).await;
    assert!(app.rechecks.try_recv().is_err());

    let (status, body) = app
        .put(
            &format!("/api/hedgehogs/{}", hedgehog_id),
            json!({"description": "Found in a garden"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Found in a garden");
    assert_eq!(
        app.rechecks.try_recv().ok(),
        Some(SweepScope::MissingWeighing)
    );
    assert!(app.rechecks.try_recv().is_err());
}

#[tokio::test]
async fn test_weight_record_for_unknown_hedgehog_queues_nothing() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let mut app = TestApp::with_pool(pool);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/weight-records",
            Some(json!({"hedgehog_id": i64::MAX, "weight": 400.0})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.rechecks.try_recv().is_err());
}

// ============================================================================
// Notification repository
// ============================================================================

#[tokio::test]
async fn test_has_recent_respects_window_and_dismissal() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = NotificationRepository::new(pool.clone());
    let hedgehog_id = create_hedgehog(&pool).await;
    let now = test_now();
    let since = now - Duration::hours(24);
    let kind = NotificationType::TherapyExpired;

    assert!(!repo.has_recent(Some(hedgehog_id), kind, since).await.unwrap());

    let stored = repo
        .insert(
            alert(hedgehog_id, kind, NotificationPriority::High),
            now - Duration::hours(2),
        )
        .await
        .unwrap();

    assert!(repo.has_recent(Some(hedgehog_id), kind, since).await.unwrap());
    // Other types and other hedgehogs are not covered
    assert!(!repo
        .has_recent(Some(hedgehog_id), NotificationType::NoWeighing, since)
        .await
        .unwrap());
    assert!(!repo
        .has_recent(Some(hedgehog_id + 1_000_000), kind, since)
        .await
        .unwrap());

    assert!(repo.dismiss(stored.id).await.unwrap());
    assert!(!repo.has_recent(Some(hedgehog_id), kind, since).await.unwrap());

    cleanup_notifications(&pool, hedgehog_id).await;
}

#[tokio::test]
async fn test_has_recent_ignores_notifications_outside_window() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = NotificationRepository::new(pool.clone());
    let hedgehog_id = create_hedgehog(&pool).await;
    let now = test_now();
    let kind = NotificationType::NoWeighing;

    repo.insert(
        alert(hedgehog_id, kind, NotificationPriority::Medium),
        now - Duration::hours(30),
    )
    .await
    .unwrap();

    assert!(!repo
        .has_recent(Some(hedgehog_id), kind, now - Duration::hours(24))
        .await
        .unwrap());
    assert!(repo
        .has_recent(Some(hedgehog_id), kind, now - Duration::hours(48))
        .await
        .unwrap());

    cleanup_notifications(&pool, hedgehog_id).await;
}

#[tokio::test]
async fn test_delete_expired_uses_strict_cutoff() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = NotificationRepository::new(pool.clone());
    let hedgehog_id = create_hedgehog(&pool).await;
    let now = test_now();

    let expiring = |at: DateTime<Utc>| {
        let mut n = alert(
            hedgehog_id,
            NotificationType::WeightStagnation,
            NotificationPriority::Medium,
        );
        n.expires_at = Some(at);
        n
    };
    let expired = repo
        .insert(expiring(now - Duration::seconds(1)), now - Duration::days(30))
        .await
        .unwrap();
    let live = repo
        .insert(expiring(now + Duration::seconds(1)), now - Duration::days(30))
        .await
        .unwrap();

    let deleted = repo.delete_expired(now).await.unwrap();

    assert!(deleted >= 1);
    assert!(!exists(&pool, expired.id).await);
    assert!(exists(&pool, live.id).await);

    cleanup_notifications(&pool, hedgehog_id).await;
}

#[tokio::test]
async fn test_delete_read_before_keeps_unread_and_recent() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = NotificationRepository::new(pool.clone());
    let hedgehog_id = create_hedgehog(&pool).await;
    let now = test_now();
    let kind = NotificationType::WeightDrop;

    let old_read = repo
        .insert(
            alert(hedgehog_id, kind, NotificationPriority::Critical),
            now - Duration::days(31),
        )
        .await
        .unwrap();
    let old_unread = repo
        .insert(
            alert(hedgehog_id, kind, NotificationPriority::Critical),
            now - Duration::days(31),
        )
        .await
        .unwrap();
    let recent_read = repo
        .insert(
            alert(hedgehog_id, kind, NotificationPriority::Critical),
            now - Duration::days(29),
        )
        .await
        .unwrap();
    repo.mark_read(old_read.id).await.unwrap();
    repo.mark_read(recent_read.id).await.unwrap();

    repo.delete_read_before(now - Duration::days(30))
        .await
        .unwrap();

    assert!(!exists(&pool, old_read.id).await);
    assert!(exists(&pool, old_unread.id).await);
    assert!(exists(&pool, recent_read.id).await);

    cleanup_notifications(&pool, hedgehog_id).await;
}

#[tokio::test]
async fn test_list_orders_by_priority_rank_then_recency() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repo = NotificationRepository::new(pool.clone());
    let hedgehog_id = create_hedgehog(&pool).await;
    let now = test_now();
    let kind = NotificationType::SystemAlert;

    let low = repo
        .insert(alert(hedgehog_id, kind, NotificationPriority::Low), now)
        .await
        .unwrap();
    let critical = repo
        .insert(
            alert(hedgehog_id, kind, NotificationPriority::Critical),
            now - Duration::hours(3),
        )
        .await
        .unwrap();
    let medium_old = repo
        .insert(
            alert(hedgehog_id, kind, NotificationPriority::Medium),
            now - Duration::hours(2),
        )
        .await
        .unwrap();
    let medium_new = repo
        .insert(
            alert(hedgehog_id, kind, NotificationPriority::Medium),
            now - Duration::hours(1),
        )
        .await
        .unwrap();
    let dismissed = repo
        .insert(alert(hedgehog_id, kind, NotificationPriority::High), now)
        .await
        .unwrap();
    repo.dismiss(dismissed.id).await.unwrap();

    let query = NotificationQuery {
        notification_type: Some(kind),
        limit: Some(10_000),
        ..Default::default()
    };
    let ids: Vec<i64> = repo
        .list(&query)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.hedgehog_id == Some(hedgehog_id))
        .map(|n| n.id)
        .collect();

    // Severity rank, not text order; dismissed rows never listed
    assert_eq!(ids, vec![critical.id, medium_new.id, medium_old.id, low.id]);

    cleanup_notifications(&pool, hedgehog_id).await;
}
