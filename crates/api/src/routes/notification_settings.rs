//! Notification settings endpoint handlers.

use axum::{extract::State, Json};
use domain::models::{NotificationSettings, UpdateNotificationSettingsRequest};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/notification-settings
///
/// Creates the defaults on first access.
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<NotificationSettings>, ApiError> {
    let settings = state.settings_store.get_or_create(state.clock.now()).await?;
    Ok(Json(settings))
}

/// PUT /api/notification-settings
///
/// Stores the merged settings and publishes them to the engine and the
/// delivery sinks.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateNotificationSettingsRequest>,
) -> Result<Json<NotificationSettings>, ApiError> {
    request.validate()?;

    let now = state.clock.now();
    let mut settings = state.settings_store.get_or_create(now).await?;
    settings.apply(request);
    let stored = state.settings_store.update(&settings, now).await?;

    state.settings_tx.send_replace(stored.clone());

    info!(
        email = stored.email_delivery_enabled(),
        webhook = stored.webhook_delivery_enabled(),
        "Notification settings updated"
    );
    Ok(Json(stored))
}
