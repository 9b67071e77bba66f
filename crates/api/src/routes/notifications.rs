//! Notification endpoint handlers.
//!
//! Notifications are produced by the engine only; clients can list them,
//! mark them read, dismiss them and trigger evaluation passes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{Notification, NotificationAnalytics, NotificationQuery, NotificationStats};
use tracing::{error, info};

use super::MessageResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{SummaryOutcome, SweepScope};

/// GET /api/notifications
///
/// Dismissed notifications are never listed.
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state.notifications.list(&query).await?;
    Ok(Json(notifications))
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, ApiError> {
    let notification = state
        .notifications
        .mark_read(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;
    Ok(Json(notification))
}

/// DELETE /api/notifications/:id
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.notifications.dismiss(id).await? {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    info!(notification_id = id, "Notification dismissed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/notifications/stats
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<NotificationStats>, ApiError> {
    Ok(Json(state.notifications.stats().await?))
}

/// GET /api/notifications/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<NotificationAnalytics>, ApiError> {
    let analytics = state.notifications.analytics(state.clock.now()).await?;
    Ok(Json(analytics))
}

/// POST /api/notifications/check
///
/// Queues a full sweep and returns before it runs.
pub async fn trigger_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if !state.rechecks.submit(SweepScope::Full) {
        return Err(ApiError::ServiceUnavailable(
            "Notification check queue is full, try again later".to_string(),
        ));
    }

    info!("Manual notification check queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Notification check started")),
    ))
}

/// POST /api/notifications/summary
///
/// Sends the daily summary email in the background.
pub async fn trigger_summary(State(state): State<AppState>) -> (StatusCode, Json<MessageResponse>) {
    let summary = state.summary.clone();
    tokio::spawn(async move {
        match summary.send().await {
            Ok(SummaryOutcome::Sent { notifications }) => {
                info!(notifications, "Daily summary sent on request")
            }
            Ok(outcome) => info!(outcome = ?outcome, "Daily summary skipped"),
            Err(e) => error!(error = %e, "Daily summary failed"),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Daily summary started")),
    )
}
