use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::models::NotificationSettings;
use domain::services::{CareRecords, NotificationStore, SettingsStore};
use persistence::repositories::{NotificationRepository, NotificationSettingsRepository};
use persistence::PgCareRecords;
use shared::time::Clock;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{
    analysis, delivery_test, health, hedgehogs, notification_settings, notifications, rooms,
    therapies, weight_records,
};
use crate::services::{
    DailySummary, Dispatcher, EmailService, NotificationEngine, RecheckQueue, SweepScope,
    WebhookError, WebhookSender,
};

/// Storage backends behind the notification engine.
#[derive(Clone)]
pub struct Stores {
    pub care: Arc<dyn CareRecords>,
    pub notifications: Arc<dyn NotificationStore>,
    pub settings: Arc<dyn SettingsStore>,
}

impl Stores {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            care: Arc::new(PgCareRecords::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            settings: Arc::new(NotificationSettingsRepository::new(pool.clone())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub notifications: Arc<dyn NotificationStore>,
    pub settings_store: Arc<dyn SettingsStore>,
    /// Current settings; every engine component holds a receiver.
    pub settings_tx: Arc<watch::Sender<NotificationSettings>>,
    pub engine: Arc<NotificationEngine>,
    pub rechecks: RecheckQueue,
    pub dispatcher: Dispatcher,
    pub summary: DailySummary,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires the engine and its delivery sinks around `settings`.
    ///
    /// Returns the receiving end of the recheck queue, to be handed to
    /// [`crate::services::spawn_recheck_worker`].
    pub fn build(
        pool: PgPool,
        config: Config,
        stores: Stores,
        settings: NotificationSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, mpsc::Receiver<SweepScope>), WebhookError> {
        let (settings_tx, settings_rx) = watch::channel(settings);

        let email = EmailService::new(config.email.clone());
        let webhook = WebhookSender::new(&config.webhook)?;
        let dispatcher = Dispatcher::new(
            email.clone(),
            webhook,
            settings_rx.clone(),
            Arc::clone(&clock),
        );

        let engine = Arc::new(NotificationEngine::new(
            stores.care,
            Arc::clone(&stores.notifications),
            settings_rx.clone(),
            dispatcher.clone(),
            Arc::clone(&clock),
        ));
        let summary = DailySummary::new(
            Arc::clone(&stores.notifications),
            email,
            settings_rx,
            Arc::clone(&clock),
        );
        let (rechecks, recheck_rx) =
            RecheckQueue::new(config.notifications.recheck_queue_capacity);

        let state = Self {
            pool,
            config: Arc::new(config),
            notifications: stores.notifications,
            settings_store: stores.settings,
            settings_tx: Arc::new(settings_tx),
            engine,
            rechecks,
            dispatcher,
            summary,
            clock,
        };
        Ok((state, recheck_rx))
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let care_routes = Router::new()
        .route(
            "/api/hedgehogs",
            get(hedgehogs::list_hedgehogs).post(hedgehogs::create_hedgehog),
        )
        .route(
            "/api/hedgehogs/:id",
            get(hedgehogs::get_hedgehog)
                .put(hedgehogs::update_hedgehog)
                .delete(hedgehogs::delete_hedgehog),
        )
        .route("/api/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/api/rooms/:id",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route("/api/areas", get(rooms::list_areas).post(rooms::create_area))
        .route(
            "/api/areas/:id",
            put(rooms::update_area).delete(rooms::delete_area),
        )
        .route(
            "/api/therapies",
            get(therapies::list_therapies).post(therapies::create_therapy),
        )
        .route(
            "/api/therapies/:id",
            put(therapies::update_therapy).delete(therapies::delete_therapy),
        )
        .route(
            "/api/weight-records",
            get(weight_records::list_weight_records).post(weight_records::create_weight_record),
        )
        .route(
            "/api/weight-records/:id",
            put(weight_records::update_weight_record)
                .delete(weight_records::delete_weight_record),
        );

    let notification_routes = Router::new()
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/stats", get(notifications::get_stats))
        .route(
            "/api/notifications/analytics",
            get(notifications::get_analytics),
        )
        .route("/api/notifications/check", post(notifications::trigger_check))
        .route(
            "/api/notifications/summary",
            post(notifications::trigger_summary),
        )
        .route("/api/notifications/:id/read", put(notifications::mark_read))
        .route(
            "/api/notifications/:id",
            delete(notifications::dismiss_notification),
        )
        .route("/api/analysis/weight", get(analysis::weight_analysis))
        .route("/api/analysis/therapy", get(analysis::therapy_analysis))
        .route(
            "/api/notification-settings",
            get(notification_settings::get_settings).put(notification_settings::update_settings),
        )
        .route("/api/test/email", post(delivery_test::test_email))
        .route("/api/test/webhook", post(delivery_test::test_webhook));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(care_routes)
        .merge(notification_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
