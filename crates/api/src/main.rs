use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use rescue_api::app::{self, AppState, Stores};
use rescue_api::config::Config;
use rescue_api::jobs::{DailySummaryJob, JobScheduler, NotificationSweepJob, PoolMetricsJob};
use rescue_api::middleware::{self, logging::init_logging};
use rescue_api::services::spawn_recheck_worker;
use shared::time::{Clock, SystemClock};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;

    init_logging(&config.logging).context("failed to initialize logging")?;
    middleware::init_metrics().context("failed to install metrics recorder")?;

    info!("Starting Hedgehog Rescue API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config())
        .await
        .context("failed to connect to database")?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    info!("Migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let stores = Stores::postgres(&pool);
    let settings = stores
        .settings
        .get_or_create(clock.now())
        .await
        .context("failed to load notification settings")?;
    info!(
        therapy_expired_enabled = settings.therapy_expired_enabled,
        email = settings.email_delivery_enabled(),
        webhook = settings.webhook_delivery_enabled(),
        "Notification settings loaded"
    );

    let addr = config.socket_addr()?;
    let notifications = config.notifications.clone();
    let (state, recheck_rx) = AppState::build(pool.clone(), config, stores, settings, clock)
        .context("failed to build application state")?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(NotificationSweepJob::new(
        Arc::clone(&state.engine),
        notifications.sweep_interval_minutes,
        Duration::from_secs(notifications.initial_delay_secs),
    ));
    scheduler.register(DailySummaryJob::new(
        state.summary.clone(),
        notifications.daily_summary_hour,
    ));
    scheduler.register(PoolMetricsJob::new(pool));
    scheduler.start();

    let recheck_worker = spawn_recheck_worker(
        Arc::clone(&state.engine),
        recheck_rx,
        scheduler.shutdown_signal(),
    );

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped accepting connections, stopping background jobs");
    scheduler.shutdown();
    scheduler.wait_for_shutdown(SHUTDOWN_TIMEOUT).await;
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, recheck_worker).await.is_err() {
        tracing::warn!("Recheck worker did not stop in time");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
