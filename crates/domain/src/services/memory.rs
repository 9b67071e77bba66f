//! In-memory store for tests. Enabled outside this crate by the `test-util`
//! feature.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, MutexGuard};

use super::store::{CareRecords, NotificationStore, SettingsStore, StoreError};
use crate::models::notification::trend_day_starts;
use crate::models::{
    DailyCount, Hedgehog, NewNotification, Notification, NotificationAnalytics,
    NotificationPriority, NotificationQuery, NotificationSettings, NotificationStats,
    NotificationType, Therapy, TherapyWithHedgehog, WeightRecord,
};

#[derive(Debug, Default)]
struct State {
    hedgehogs: Vec<Hedgehog>,
    therapies: Vec<Therapy>,
    weights: Vec<WeightRecord>,
    notifications: Vec<Notification>,
    settings: Option<NotificationSettings>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store keeping every record in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_hedgehog(&self, hedgehog: Hedgehog) {
        self.lock().hedgehogs.push(hedgehog);
    }

    pub fn add_therapy(&self, therapy: Therapy) {
        self.lock().therapies.push(therapy);
    }

    pub fn add_weight(&self, record: WeightRecord) {
        self.lock().weights.push(record);
    }

    /// Stores a notification as-is, keeping its id and timestamps.
    pub fn add_notification(&self, notification: Notification) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(notification.id);
        state.notifications.push(notification);
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub fn notifications_of_type(&self, notification_type: NotificationType) -> Vec<Notification> {
        self.lock()
            .notifications
            .iter()
            .filter(|n| n.notification_type == notification_type)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl CareRecords for InMemoryStore {
    async fn hedgehogs_in_care(&self) -> Result<Vec<Hedgehog>, StoreError> {
        Ok(self
            .lock()
            .hedgehogs
            .iter()
            .filter(|h| h.is_in_care())
            .cloned()
            .collect())
    }

    async fn active_therapies(&self) -> Result<Vec<TherapyWithHedgehog>, StoreError> {
        let state = self.lock();
        Ok(state
            .therapies
            .iter()
            .filter(|t| t.is_active())
            .map(|t| TherapyWithHedgehog {
                therapy: t.clone(),
                hedgehog_name: state
                    .hedgehogs
                    .iter()
                    .find(|h| h.id == t.hedgehog_id)
                    .map(|h| h.name.clone()),
            })
            .collect())
    }

    async fn recent_weights(
        &self,
        hedgehog_id: i64,
        limit: i64,
    ) -> Result<Vec<WeightRecord>, StoreError> {
        let mut records: Vec<WeightRecord> = self
            .lock()
            .weights
            .iter()
            .filter(|r| r.hedgehog_id == hedgehog_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(records)
    }
}

#[async_trait::async_trait]
impl NotificationStore for InMemoryStore {
    async fn has_recent(
        &self,
        hedgehog_id: Option<i64>,
        notification_type: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self.lock().notifications.iter().any(|n| {
            !n.dismissed
                && n.hedgehog_id == hedgehog_id
                && n.notification_type == notification_type
                && n.created_at > since
        }))
    }

    async fn insert(
        &self,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, StoreError> {
        let mut state = self.lock();
        let mut stored = notification.into_transient(now);
        stored.id = state.next_id();
        state.notifications.push(stored.clone());
        Ok(stored)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.lock();
        let before = state.notifications.len();
        state.notifications.retain(|n| !n.is_expired(now));
        Ok((before - state.notifications.len()) as u64)
    }

    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.lock();
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.read && n.created_at < cutoff));
        Ok((before - state.notifications.len()) as u64)
    }

    async fn list(&self, query: &NotificationQuery) -> Result<Vec<Notification>, StoreError> {
        let mut matching: Vec<Notification> = self
            .lock()
            .notifications
            .iter()
            .filter(|n| query.matches(n))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        matching.truncate(usize::try_from(query.effective_limit()).unwrap_or(0));
        Ok(matching)
    }

    async fn mark_read(&self, id: i64) -> Result<Option<Notification>, StoreError> {
        let mut state = self.lock();
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| {
                n.read = true;
                n.clone()
            }))
    }

    async fn dismiss(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.lock();
        match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.dismissed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn stats(&self) -> Result<NotificationStats, StoreError> {
        let state = self.lock();
        let mut stats = NotificationStats::default();
        for n in state.notifications.iter().filter(|n| !n.dismissed) {
            stats.total += 1;
            if !n.read {
                stats.unread += 1;
            }
            match n.priority {
                NotificationPriority::Critical => stats.critical += 1,
                NotificationPriority::High => stats.high += 1,
                _ => {}
            }
            *stats
                .by_type
                .entry(n.notification_type.to_string())
                .or_insert(0) += 1;
        }
        Ok(stats)
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Notification>, StoreError> {
        let mut recent: Vec<Notification> = self
            .lock()
            .notifications
            .iter()
            .filter(|n| !n.dismissed && n.created_at >= since)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recent)
    }

    async fn analytics(&self, now: DateTime<Utc>) -> Result<NotificationAnalytics, StoreError> {
        let state = self.lock();
        let day_ago = now - Duration::days(1);
        let week_ago = now - Duration::days(7);
        let mut analytics = NotificationAnalytics::default();

        for n in &state.notifications {
            if n.created_at >= day_ago {
                analytics.last_24_hours += 1;
            }
            if n.created_at >= week_ago {
                analytics.last_week += 1;
                *analytics
                    .by_type
                    .entry(n.notification_type.to_string())
                    .or_insert(0) += 1;
                *analytics
                    .by_priority
                    .entry(n.priority.to_string())
                    .or_insert(0) += 1;
            }
        }

        analytics.trend_data = trend_day_starts(now)
            .into_iter()
            .map(|start| {
                let end = start + Duration::days(1);
                DailyCount {
                    date: start.format("%Y-%m-%d").to_string(),
                    count: state
                        .notifications
                        .iter()
                        .filter(|n| n.created_at >= start && n.created_at < end)
                        .count() as i64,
                }
            })
            .collect();

        Ok(analytics)
    }
}

#[async_trait::async_trait]
impl SettingsStore for InMemoryStore {
    async fn get_or_create(&self, now: DateTime<Utc>) -> Result<NotificationSettings, StoreError> {
        let mut state = self.lock();
        if state.settings.is_none() {
            let mut defaults = NotificationSettings::defaults(now);
            defaults.id = 1;
            state.settings = Some(defaults);
        }
        state
            .settings
            .clone()
            .ok_or_else(|| StoreError::NotFound("notification settings".to_string()))
    }

    async fn update(
        &self,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Result<NotificationSettings, StoreError> {
        let mut state = self.lock();
        let mut stored = settings.clone();
        stored.id = 1;
        stored.updated_at = now;
        if let Some(existing) = &state.settings {
            stored.created_at = existing.created_at;
        }
        state.settings = Some(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn candidate(hedgehog_id: i64, notification_type: NotificationType) -> NewNotification {
        NewNotification {
            notification_type,
            priority: NotificationPriority::Medium,
            title: "t".into(),
            message: "m".into(),
            hedgehog_id: Some(hedgehog_id),
            therapy_id: None,
            data: "{}".into(),
            expires_at: None,
            action_url: String::new(),
            action_label: String::new(),
        }
    }

    #[tokio::test]
    async fn test_has_recent_respects_window_and_dismissal() {
        let store = InMemoryStore::new();
        let inserted = store
            .insert(candidate(1, NotificationType::WeightDrop), now())
            .await
            .unwrap();

        let since = now() - Duration::hours(24);
        assert!(store
            .has_recent(Some(1), NotificationType::WeightDrop, since)
            .await
            .unwrap());
        assert!(!store
            .has_recent(Some(2), NotificationType::WeightDrop, since)
            .await
            .unwrap());
        assert!(!store
            .has_recent(Some(1), NotificationType::NoWeighing, since)
            .await
            .unwrap());

        store.dismiss(inserted.id).await.unwrap();
        assert!(!store
            .has_recent(Some(1), NotificationType::WeightDrop, since)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_list_orders_by_priority_then_recency() {
        let store = InMemoryStore::new();
        let mut low = candidate(1, NotificationType::NoWeighing);
        low.priority = NotificationPriority::Low;
        let mut critical = candidate(2, NotificationType::WeightDrop);
        critical.priority = NotificationPriority::Critical;
        let mut high = candidate(3, NotificationType::TherapyExpired);
        high.priority = NotificationPriority::High;

        store.insert(low, now()).await.unwrap();
        store.insert(high, now() - Duration::hours(1)).await.unwrap();
        store.insert(critical, now() - Duration::hours(2)).await.unwrap();
        let newer_medium = store
            .insert(candidate(4, NotificationType::WeightStagnation), now())
            .await
            .unwrap();
        let older_medium = store
            .insert(
                candidate(5, NotificationType::WeightStagnation),
                now() - Duration::hours(3),
            )
            .await
            .unwrap();

        let listed = store.list(&NotificationQuery::default()).await.unwrap();
        let priorities: Vec<_> = listed.iter().map(|n| n.priority).collect();
        assert_eq!(
            priorities,
            vec![
                NotificationPriority::Critical,
                NotificationPriority::High,
                NotificationPriority::Medium,
                NotificationPriority::Medium,
                NotificationPriority::Low,
            ]
        );
        assert_eq!(listed[2].id, newer_medium.id);
        assert_eq!(listed[3].id, older_medium.id);

        let limited = store
            .list(&NotificationQuery {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_cleanup() {
        let store = InMemoryStore::new();
        let mut expired = candidate(1, NotificationType::WeightDrop);
        expired.expires_at = Some(now() - Duration::seconds(1));
        let mut live = candidate(2, NotificationType::WeightDrop);
        live.expires_at = Some(now() + Duration::seconds(1));
        store.insert(expired, now() - Duration::days(1)).await.unwrap();
        store.insert(live, now() - Duration::days(1)).await.unwrap();

        assert_eq!(store.delete_expired(now()).await.unwrap(), 1);
        let remaining = store.notifications();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].hedgehog_id, Some(2));

        let old_read = store
            .insert(candidate(3, NotificationType::NoWeighing), now() - Duration::days(31))
            .await
            .unwrap();
        store.mark_read(old_read.id).await.unwrap();
        store
            .insert(candidate(4, NotificationType::NoWeighing), now() - Duration::days(31))
            .await
            .unwrap();

        let removed = store
            .delete_read_before(now() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.notifications().len(), 2);
    }

    #[tokio::test]
    async fn test_stats_skip_dismissed() {
        let store = InMemoryStore::new();
        let mut critical = candidate(1, NotificationType::WeightDrop);
        critical.priority = NotificationPriority::Critical;
        let critical = store.insert(critical, now()).await.unwrap();
        let mut high = candidate(2, NotificationType::TherapyExpired);
        high.priority = NotificationPriority::High;
        store.insert(high, now()).await.unwrap();
        let dismissed = store
            .insert(candidate(3, NotificationType::NoWeighing), now())
            .await
            .unwrap();

        store.mark_read(critical.id).await.unwrap();
        store.dismiss(dismissed.id).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.unread, 1);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.by_type.get("weight_drop"), Some(&1));
        assert!(stats.by_type.get("no_weighing").is_none());
    }

    #[tokio::test]
    async fn test_mark_read_and_dismiss_missing() {
        let store = InMemoryStore::new();
        assert!(store.mark_read(42).await.unwrap().is_none());
        assert!(!store.dismiss(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_analytics_buckets() {
        let store = InMemoryStore::new();
        store
            .insert(candidate(1, NotificationType::WeightDrop), now())
            .await
            .unwrap();
        store
            .insert(candidate(2, NotificationType::NoWeighing), now() - Duration::days(3))
            .await
            .unwrap();
        store
            .insert(candidate(3, NotificationType::NoWeighing), now() - Duration::days(10))
            .await
            .unwrap();

        let analytics = store.analytics(now()).await.unwrap();
        assert_eq!(analytics.last_24_hours, 1);
        assert_eq!(analytics.last_week, 2);
        assert_eq!(analytics.by_type.get("no_weighing"), Some(&1));
        assert_eq!(analytics.by_priority.get("medium"), Some(&2));
        assert_eq!(analytics.trend_data.len(), 7);
        assert_eq!(analytics.trend_data[6].date, "2024-06-01");
        assert_eq!(analytics.trend_data[6].count, 1);
        assert_eq!(analytics.trend_data[3].date, "2024-05-29");
        assert_eq!(analytics.trend_data[3].count, 1);
    }

    #[tokio::test]
    async fn test_settings_lazily_created() {
        let store = InMemoryStore::new();
        let settings = store.get_or_create(now()).await.unwrap();
        assert_eq!(settings.therapy_expiring_days, 3);

        let mut changed = settings.clone();
        changed.no_weighing_days = 2;
        store.update(&changed, now() + Duration::hours(1)).await.unwrap();

        let reloaded = store.get_or_create(now()).await.unwrap();
        assert_eq!(reloaded.no_weighing_days, 2);
        assert_eq!(reloaded.created_at, settings.created_at);
    }
}
