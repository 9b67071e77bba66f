//! Rule-based notification engine.
//!
//! A pass loads the current settings, runs the requested evaluators over the
//! care records, suppresses candidates that are still covered by a recent
//! notification of the same type for the same hedgehog, persists the rest and
//! hands each one to the [`Dispatcher`].
//!
//! Store failures never abort a pass: they are logged and the next item is
//! evaluated.

use chrono::{DateTime, Duration, Utc};
use domain::models::notification::READ_RETENTION_DAYS;
use domain::models::{NotificationSettings, TherapyAnalysis, WeightAnalysis};
use domain::services::{
    analyze_therapy, analyze_weight, evaluate_missing_weighing, evaluate_therapies,
    sort_therapy_analyses, sort_weight_analyses, weight_alert, AlertCandidate, CareRecords,
    NotificationStore, StoreError, WEIGHT_HISTORY_LIMIT,
};
use serde::Serialize;
use shared::time::Clock;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

use super::dispatcher::Dispatcher;
use crate::middleware::metrics::{
    record_evaluation_error, record_notification_created, record_notification_suppressed,
    record_sweep,
};

/// Which evaluators a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepScope {
    /// Cleanup followed by every evaluator.
    Full,
    Therapy,
    Weight,
    MissingWeighing,
}

impl SweepScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepScope::Full => "full",
            SweepScope::Therapy => "therapy",
            SweepScope::Weight => "weight",
            SweepScope::MissingWeighing => "missing_weighing",
        }
    }
}

/// Outcome counters of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub created: u32,
    pub suppressed: u32,
    pub errors: u32,
    pub purged: u64,
}

pub struct NotificationEngine {
    care: Arc<dyn CareRecords>,
    notifications: Arc<dyn NotificationStore>,
    settings: watch::Receiver<NotificationSettings>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
}

impl NotificationEngine {
    pub fn new(
        care: Arc<dyn CareRecords>,
        notifications: Arc<dyn NotificationStore>,
        settings: watch::Receiver<NotificationSettings>,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            care,
            notifications,
            settings,
            dispatcher,
            clock,
        }
    }

    /// Runs one pass over the given scope.
    #[instrument(skip_all, fields(scope = scope.as_str()))]
    pub async fn run(&self, scope: SweepScope) -> SweepReport {
        let started = Instant::now();
        let now = self.clock.now();
        let settings = self.settings.borrow().clone();
        let mut report = SweepReport::default();

        match scope {
            SweepScope::Full => {
                self.cleanup(now, &mut report).await;
                self.check_therapies(&settings, now, &mut report).await;
                self.check_weights(&settings, now, &mut report).await;
                self.check_missing_weighings(&settings, now, &mut report).await;
            }
            SweepScope::Therapy => self.check_therapies(&settings, now, &mut report).await,
            SweepScope::Weight => self.check_weights(&settings, now, &mut report).await,
            SweepScope::MissingWeighing => {
                self.check_missing_weighings(&settings, now, &mut report).await
            }
        }

        record_sweep(scope.as_str(), started.elapsed().as_secs_f64());
        info!(
            created = report.created,
            suppressed = report.suppressed,
            errors = report.errors,
            purged = report.purged,
            "Notification check completed"
        );
        report
    }

    /// Hard-deletes expired notifications and read ones past retention.
    async fn cleanup(&self, now: DateTime<Utc>, report: &mut SweepReport) {
        match self.notifications.delete_expired(now).await {
            Ok(count) => report.purged += count,
            Err(e) => self.fail("cleanup_expired", &e, report),
        }

        let cutoff = now - Duration::days(READ_RETENTION_DAYS);
        match self.notifications.delete_read_before(cutoff).await {
            Ok(count) => report.purged += count,
            Err(e) => self.fail("cleanup_read", &e, report),
        }
    }

    async fn check_therapies(
        &self,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) {
        if !settings.therapy_expired_enabled {
            debug!("Therapy checks disabled");
            return;
        }

        let therapies = match self.care.active_therapies().await {
            Ok(therapies) => therapies,
            Err(e) => return self.fail("load_therapies", &e, report),
        };

        for candidate in evaluate_therapies(&therapies, settings, now) {
            self.submit(candidate, now, report).await;
        }
    }

    async fn check_weights(
        &self,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) {
        for analysis in self.analyze_weights(settings, now, report).await {
            if let Some(candidate) = weight_alert(&analysis) {
                self.submit(candidate, now, report).await;
            }
        }
    }

    async fn check_missing_weighings(
        &self,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) {
        let hedgehogs = match self.care.hedgehogs_in_care().await {
            Ok(hedgehogs) => hedgehogs,
            Err(e) => return self.fail("load_hedgehogs", &e, report),
        };

        for hedgehog in &hedgehogs {
            let latest = match self.care.recent_weights(hedgehog.id, 1).await {
                Ok(records) => records,
                Err(e) => {
                    self.fail("load_weights", &e, report);
                    continue;
                }
            };

            let candidate = evaluate_missing_weighing(hedgehog, latest.first(), settings, now);
            if let Some(candidate) = candidate {
                self.submit(candidate, now, report).await;
            }
        }
    }

    async fn analyze_weights(
        &self,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> Vec<WeightAnalysis> {
        let hedgehogs = match self.care.hedgehogs_in_care().await {
            Ok(hedgehogs) => hedgehogs,
            Err(e) => {
                self.fail("load_hedgehogs", &e, report);
                return Vec::new();
            }
        };

        let mut analyses = Vec::new();
        for hedgehog in &hedgehogs {
            match self
                .care
                .recent_weights(hedgehog.id, WEIGHT_HISTORY_LIMIT)
                .await
            {
                Ok(records) => {
                    analyses.extend(analyze_weight(hedgehog, &records, settings, now));
                }
                Err(e) => self.fail("load_weights", &e, report),
            }
        }
        analyses
    }

    /// Dedup check, insert, dispatch.
    async fn submit(
        &self,
        candidate: AlertCandidate,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) {
        let notification_type = candidate.notification_type;
        let since = now - notification_type.dedup_window();

        match self
            .notifications
            .has_recent(Some(candidate.hedgehog_id), notification_type, since)
            .await
        {
            Ok(true) => {
                report.suppressed += 1;
                record_notification_suppressed(notification_type.as_str());
                debug!(
                    hedgehog_id = candidate.hedgehog_id,
                    notification_type = notification_type.as_str(),
                    "Recent notification exists, skipping"
                );
                return;
            }
            Ok(false) => {}
            Err(e) => return self.fail("dedup_check", &e, report),
        }

        let new_notification = candidate.into_notification().with_default_expiry(now);
        match self.notifications.insert(new_notification, now).await {
            Ok(notification) => {
                report.created += 1;
                record_notification_created(
                    notification.notification_type.as_str(),
                    notification.priority.as_str(),
                );
                info!(
                    notification_id = notification.id,
                    notification_type = notification.notification_type.as_str(),
                    priority = notification.priority.as_str(),
                    hedgehog_id = ?notification.hedgehog_id,
                    "Notification created"
                );
                self.dispatcher.dispatch(&notification);
            }
            Err(e) => self.fail("insert", &e, report),
        }
    }

    fn fail(&self, stage: &'static str, error: &StoreError, report: &mut SweepReport) {
        report.errors += 1;
        record_evaluation_error(stage);
        error!(stage, error = %error, "Notification check step failed");
    }

    /// Weight analysis of every hedgehog in care, alerts first.
    pub async fn weight_snapshot(&self) -> Result<Vec<WeightAnalysis>, StoreError> {
        let now = self.clock.now();
        let settings = self.settings.borrow().clone();

        let mut analyses = Vec::new();
        for hedgehog in self.care.hedgehogs_in_care().await? {
            let records = self
                .care
                .recent_weights(hedgehog.id, WEIGHT_HISTORY_LIMIT)
                .await?;
            analyses.extend(analyze_weight(&hedgehog, &records, &settings, now));
        }

        sort_weight_analyses(&mut analyses);
        Ok(analyses)
    }

    /// Analysis of every active therapy, alerts first.
    pub async fn therapy_snapshot(&self) -> Result<Vec<TherapyAnalysis>, StoreError> {
        let now = self.clock.now();
        let settings = self.settings.borrow().clone();

        let mut analyses: Vec<TherapyAnalysis> = self
            .care
            .active_therapies()
            .await?
            .iter()
            .map(|entry| analyze_therapy(entry, &settings, now))
            .collect();

        sort_therapy_analyses(&mut analyses);
        Ok(analyses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmailConfig, WebhookConfig};
    use crate::services::email::EmailService;
    use crate::services::webhook::WebhookSender;
    use chrono::TimeZone;
    use domain::models::{
        Hedgehog, HedgehogStatus, Notification, NotificationPriority, NotificationType, Therapy,
        TherapyStatus, WeightRecord,
    };
    use domain::services::InMemoryStore;
    use shared::time::ManualClock;

    struct Harness {
        store: Arc<InMemoryStore>,
        clock: Arc<ManualClock>,
        engine: NotificationEngine,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let (_tx, rx) = watch::channel(NotificationSettings::defaults(start()));
        let dispatcher = Dispatcher::new(
            EmailService::new(EmailConfig::default()),
            WebhookSender::new(&WebhookConfig::default()).unwrap(),
            rx.clone(),
            clock.clone(),
        );
        let engine = NotificationEngine::new(
            store.clone(),
            store.clone(),
            rx,
            dispatcher,
            clock.clone(),
        );
        Harness {
            store,
            clock,
            engine,
        }
    }

    fn hedgehog(id: i64, name: &str) -> Hedgehog {
        Hedgehog {
            id,
            name: name.to_string(),
            description: String::new(),
            arrival_date: start() - Duration::days(20),
            status: HedgehogStatus::InCare,
            release_date: None,
            area_id: None,
            created_at: start() - Duration::days(20),
            updated_at: start() - Duration::days(20),
        }
    }

    fn therapy(id: i64, hedgehog_id: i64, end_date: Option<DateTime<Utc>>) -> Therapy {
        Therapy {
            id,
            hedgehog_id,
            name: "Antibiotic".to_string(),
            description: String::new(),
            start_date: start() - Duration::days(10),
            end_date,
            status: TherapyStatus::Active,
            created_at: start() - Duration::days(10),
            updated_at: start() - Duration::days(10),
        }
    }

    fn weight(id: i64, hedgehog_id: i64, grams: f64, days_ago: i64) -> WeightRecord {
        WeightRecord {
            id,
            hedgehog_id,
            weight: grams,
            date: start() - Duration::days(days_ago),
            notes: String::new(),
            created_at: start() - Duration::days(days_ago),
            updated_at: start() - Duration::days(days_ago),
        }
    }

    #[tokio::test]
    async fn test_expired_therapy_creates_one_notification_per_window() {
        let h = harness();
        h.store.add_hedgehog(hedgehog(1, "Spike"));
        h.store.add_weight(weight(1, 1, 500.0, 0));
        h.store
            .add_therapy(therapy(1, 1, Some(start() - Duration::days(2))));

        let first = h.engine.run(SweepScope::Full).await;
        let second = h.engine.run(SweepScope::Full).await;

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(second.suppressed, 1);

        let expired = h.store.notifications_of_type(NotificationType::TherapyExpired);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].priority, NotificationPriority::High);
        assert_eq!(expired[0].therapy_id, Some(1));
        assert_eq!(expired[0].expires_at, Some(start() + Duration::days(30)));
    }

    #[tokio::test]
    async fn test_dedup_window_elapses() {
        let h = harness();
        h.store.add_hedgehog(hedgehog(1, "Spike"));
        h.store.add_weight(weight(1, 1, 500.0, 0));
        h.store
            .add_therapy(therapy(1, 1, Some(start() - Duration::days(2))));

        h.engine.run(SweepScope::Therapy).await;
        h.clock.advance(Duration::hours(23));
        assert_eq!(h.engine.run(SweepScope::Therapy).await.created, 0);

        h.clock.advance(Duration::hours(2));
        assert_eq!(h.engine.run(SweepScope::Therapy).await.created, 1);
        assert_eq!(
            h.store
                .notifications_of_type(NotificationType::TherapyExpired)
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_significant_drop_creates_critical_alert() {
        let h = harness();
        h.store.add_hedgehog(hedgehog(1, "Spike"));
        h.store.add_weight(weight(1, 1, 460.0, 3));
        h.store.add_weight(weight(2, 1, 400.0, 1));

        let report = h.engine.run(SweepScope::Weight).await;

        assert_eq!(report.created, 1);
        let drops = h.store.notifications_of_type(NotificationType::WeightDrop);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].priority, NotificationPriority::Critical);
        assert!(drops[0].message.contains("60.0g"));
    }

    #[tokio::test]
    async fn test_single_weighing_produces_no_weight_alert() {
        let h = harness();
        h.store.add_hedgehog(hedgehog(1, "Spike"));
        h.store.add_weight(weight(1, 1, 460.0, 1));

        let report = h.engine.run(SweepScope::Weight).await;
        assert_eq!(report.created, 0);
    }

    #[tokio::test]
    async fn test_missing_weighing_scope() {
        let h = harness();
        h.store.add_hedgehog(hedgehog(1, "Spike"));
        h.store.add_hedgehog(hedgehog(2, "Bramble"));
        h.store.add_weight(weight(1, 2, 500.0, 1));

        let report = h.engine.run(SweepScope::MissingWeighing).await;

        assert_eq!(report.created, 1);
        let missing = h.store.notifications_of_type(NotificationType::NoWeighing);
        assert_eq!(missing[0].hedgehog_id, Some(1));
    }

    #[tokio::test]
    async fn test_full_sweep_purges_expired_first() {
        let h = harness();
        let stale = Notification {
            id: 1,
            notification_type: NotificationType::SystemAlert,
            priority: NotificationPriority::Low,
            title: "old".to_string(),
            message: "old".to_string(),
            hedgehog_id: None,
            therapy_id: None,
            data: "{}".to_string(),
            read: false,
            dismissed: false,
            created_at: start() - Duration::days(31),
            expires_at: Some(start() - Duration::seconds(1)),
            action_url: String::new(),
            action_label: String::new(),
        };
        let fresh = Notification {
            id: 2,
            expires_at: Some(start() + Duration::seconds(1)),
            ..stale.clone()
        };
        h.store.add_notification(stale);
        h.store.add_notification(fresh);

        let report = h.engine.run(SweepScope::Full).await;

        assert_eq!(report.purged, 1);
        let remaining = h.store.notifications();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 2);
    }

    #[tokio::test]
    async fn test_snapshots_sort_alerts_first() {
        let h = harness();
        h.store.add_hedgehog(hedgehog(1, "Spike"));
        h.store.add_hedgehog(hedgehog(2, "Bramble"));
        h.store.add_weight(weight(1, 1, 500.0, 3));
        h.store.add_weight(weight(2, 1, 505.0, 1));
        h.store.add_weight(weight(3, 2, 460.0, 3));
        h.store.add_weight(weight(4, 2, 400.0, 1));
        h.store.add_therapy(therapy(1, 1, Some(start() + Duration::days(20))));
        h.store.add_therapy(therapy(2, 2, Some(start() + Duration::days(1))));

        let weights = h.engine.weight_snapshot().await.unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].hedgehog_id, 2);
        assert!(weights[0].alert);

        let therapies = h.engine.therapy_snapshot().await.unwrap();
        assert_eq!(therapies.len(), 2);
        assert_eq!(therapies[0].therapy_id, 2);
        assert!(therapies[0].alert);
        assert!(!therapies[1].alert);
    }

    /// Holds each pass between its dedup check and its insert until both
    /// passes have checked.
    struct CheckThenInsertGate {
        inner: Arc<InMemoryStore>,
        checked: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl NotificationStore for CheckThenInsertGate {
        async fn has_recent(
            &self,
            hedgehog_id: Option<i64>,
            notification_type: NotificationType,
            since: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            let found = self
                .inner
                .has_recent(hedgehog_id, notification_type, since)
                .await;
            self.checked.wait().await;
            found
        }

        async fn insert(
            &self,
            notification: domain::models::NewNotification,
            now: DateTime<Utc>,
        ) -> Result<Notification, StoreError> {
            self.inner.insert(notification, now).await
        }

        async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
            self.inner.delete_expired(now).await
        }

        async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
            self.inner.delete_read_before(cutoff).await
        }

        async fn list(
            &self,
            query: &domain::models::NotificationQuery,
        ) -> Result<Vec<Notification>, StoreError> {
            self.inner.list(query).await
        }

        async fn mark_read(&self, id: i64) -> Result<Option<Notification>, StoreError> {
            self.inner.mark_read(id).await
        }

        async fn dismiss(&self, id: i64) -> Result<bool, StoreError> {
            self.inner.dismiss(id).await
        }

        async fn stats(&self) -> Result<domain::models::NotificationStats, StoreError> {
            self.inner.stats().await
        }

        async fn created_since(
            &self,
            since: DateTime<Utc>,
        ) -> Result<Vec<Notification>, StoreError> {
            self.inner.created_since(since).await
        }

        async fn analytics(
            &self,
            now: DateTime<Utc>,
        ) -> Result<domain::models::NotificationAnalytics, StoreError> {
            self.inner.analytics(now).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_passes_can_both_insert() {
        let store = Arc::new(InMemoryStore::new());
        store.add_hedgehog(hedgehog(1, "Spike"));
        store.add_therapy(therapy(1, 1, Some(start() - Duration::days(2))));

        let gate = Arc::new(CheckThenInsertGate {
            inner: store.clone(),
            checked: tokio::sync::Barrier::new(2),
        });
        let clock = Arc::new(ManualClock::new(start()));
        let (_tx, rx) = watch::channel(NotificationSettings::defaults(start()));
        let dispatcher = Dispatcher::new(
            EmailService::new(EmailConfig::default()),
            WebhookSender::new(&WebhookConfig::default()).unwrap(),
            rx.clone(),
            clock.clone(),
        );
        let engine = NotificationEngine::new(store.clone(), gate, rx, dispatcher, clock);

        // Both passes see no recent notification before either one writes
        let (first, second) = tokio::join!(
            engine.run(SweepScope::Therapy),
            engine.run(SweepScope::Therapy)
        );

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 1);
        assert_eq!(
            store
                .notifications_of_type(NotificationType::TherapyExpired)
                .len(),
            2
        );
    }
}
