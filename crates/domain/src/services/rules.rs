//! Rule evaluators for care alerts.
//!
//! Every evaluator is a pure function of the records, the current settings and
//! an explicit `now`. Evaluators return [`AlertCandidate`]s; deduplication and
//! persistence happen in the notification engine.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::cmp::Ordering;

use shared::time::{days_between, fractional_days_between, whole_days};

use crate::models::{
    Hedgehog, NewNotification, NotificationPriority, NotificationSettings, NotificationType,
    TherapyAnalysis, TherapyWithHedgehog, WeightAlertKind, WeightAnalysis, WeightRecord,
    WeightTrend,
};

/// Number of weighings fetched per hedgehog for weight analysis.
pub const WEIGHT_HISTORY_LIMIT: i64 = 10;

/// Number of most recent weighings used for slope averaging.
const TREND_WINDOW: usize = 5;

/// Mean slope (grams/day) above which the weight is improving.
const IMPROVING_SLOPE: f64 = 2.0;

/// Mean slope (grams/day) below which the weight is declining.
const DECLINING_SLOPE: f64 = -2.0;

/// Mean slope (grams/day) for a critical decline. Checked after the
/// declining branch, so never selected.
const CRITICAL_SLOPE: f64 = -5.0;

/// Maximum spread (grams) over the last four weighings for stagnation.
const STAGNATION_SPREAD_GRAMS: f64 = 10.0;

/// Open-ended therapies active longer than this are flagged in the snapshot.
const LONG_RUNNING_THERAPY_DAYS: i64 = 30;

/// Output of a rule evaluator prior to deduplication and persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub hedgehog_id: i64,
    pub therapy_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub data: String,
    pub action_url: String,
    pub action_label: String,
}

impl AlertCandidate {
    pub fn into_notification(self) -> NewNotification {
        NewNotification {
            notification_type: self.notification_type,
            priority: self.priority,
            title: self.title,
            message: self.message,
            hedgehog_id: Some(self.hedgehog_id),
            therapy_id: self.therapy_id,
            data: self.data,
            expires_at: None,
            action_url: self.action_url,
            action_label: self.action_label,
        }
    }
}

fn hedgehog_url(hedgehog_id: i64) -> String {
    format!("/hedgehogs/{}", hedgehog_id)
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Evaluates expiry for one therapy. Only active therapies with an end date
/// produce candidates.
pub fn evaluate_therapy_expiry(
    entry: &TherapyWithHedgehog,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Option<AlertCandidate> {
    let therapy = &entry.therapy;
    if !therapy.is_active() {
        return None;
    }
    let end_date = therapy.end_date?;
    let hedgehog_name = entry.hedgehog_display_name();

    if end_date < now {
        let days_overdue = days_between(now, end_date);
        return Some(AlertCandidate {
            notification_type: NotificationType::TherapyExpired,
            priority: NotificationPriority::High,
            hedgehog_id: therapy.hedgehog_id,
            therapy_id: Some(therapy.id),
            title: format!("Therapy expired: {}", therapy.name),
            message: format!(
                "Therapy '{}' for {} expired on {}",
                therapy.name,
                hedgehog_name,
                format_date(end_date)
            ),
            data: json!({ "days_overdue": days_overdue }).to_string(),
            action_url: hedgehog_url(therapy.hedgehog_id),
            action_label: "Manage therapy".to_string(),
        });
    }

    if end_date < now + settings.therapy_expiring_window() {
        let days_left = days_between(end_date, now);
        return Some(AlertCandidate {
            notification_type: NotificationType::TherapyExpiring,
            priority: NotificationPriority::Medium,
            hedgehog_id: therapy.hedgehog_id,
            therapy_id: Some(therapy.id),
            title: format!("Therapy expiring: {}", therapy.name),
            message: format!(
                "Therapy '{}' for {} expires in {} days",
                therapy.name, hedgehog_name, days_left
            ),
            data: json!({ "days_left": days_left }).to_string(),
            action_url: hedgehog_url(therapy.hedgehog_id),
            action_label: "Renew therapy".to_string(),
        });
    }

    None
}

/// Runs the therapy-expiry rule over all therapies. Disabled entirely by
/// `therapy_expired_enabled = false`.
pub fn evaluate_therapies(
    therapies: &[TherapyWithHedgehog],
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Vec<AlertCandidate> {
    if !settings.therapy_expired_enabled {
        return Vec::new();
    }
    therapies
        .iter()
        .filter_map(|entry| evaluate_therapy_expiry(entry, settings, now))
        .collect()
}

/// Classifies the weight direction of a newest-first weight history.
pub fn classify_trend(records: &[WeightRecord]) -> WeightTrend {
    if records.len() < 3 {
        return WeightTrend::InsufficientData;
    }

    let window = &records[..records.len().min(TREND_WINDOW)];
    let slopes: Vec<f64> = window
        .windows(2)
        .filter_map(|pair| {
            let days = fractional_days_between(pair[0].date, pair[1].date);
            (days > 0.0).then(|| (pair[0].weight - pair[1].weight) / days)
        })
        .collect();

    if slopes.is_empty() {
        return WeightTrend::Stable;
    }

    let mean = slopes.iter().sum::<f64>() / slopes.len() as f64;
    if mean > IMPROVING_SLOPE {
        WeightTrend::Improving
    } else if mean < DECLINING_SLOPE {
        WeightTrend::Declining
    } else if mean < CRITICAL_SLOPE {
        WeightTrend::Critical
    } else {
        WeightTrend::Stable
    }
}

/// Max minus min weight over the given records.
fn weight_spread(records: &[WeightRecord]) -> f64 {
    if records.len() < 2 {
        return 0.0;
    }
    let (min, max) = records
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), r| {
            (min.min(r.weight), max.max(r.weight))
        });
    max - min
}

/// Newest-first weights strictly decreasing over time: each weighing is
/// lighter than the one before it.
fn strictly_declining(records: &[WeightRecord]) -> bool {
    records.windows(2).all(|pair| pair[0].weight < pair[1].weight)
}

/// Builds the weight snapshot for one hedgehog from its newest-first history
/// (at most [`WEIGHT_HISTORY_LIMIT`] records). Returns `None` with fewer than
/// two weighings.
pub fn analyze_weight(
    hedgehog: &Hedgehog,
    records: &[WeightRecord],
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Option<WeightAnalysis> {
    if records.len() < 2 {
        return None;
    }

    let current = &records[0];
    let previous = &records[1];
    let weight_change = current.weight - previous.weight;
    let trend = classify_trend(records);

    let mut analysis = WeightAnalysis {
        hedgehog_id: hedgehog.id,
        hedgehog_name: hedgehog.name.clone(),
        current_weight: current.weight,
        previous_weight: previous.weight,
        weight_change,
        days_since_weigh: days_between(now, current.date),
        last_weigh_date: current.date,
        trend,
        alert: false,
        alert_reason: String::new(),
        alert_kind: None,
    };

    if weight_change <= -settings.weight_drop_threshold {
        analysis.flag(
            WeightAlertKind::SignificantDrop,
            format!(
                "Significant weight loss: {:.1}g in {} days",
                weight_change.abs(),
                days_between(current.date, previous.date)
            ),
        );
    } else if trend == WeightTrend::Declining
        && records.len() >= 3
        && strictly_declining(&records[..3])
    {
        analysis.flag(
            WeightAlertKind::DecliningTrend,
            "Weight trending down over the latest weighings".to_string(),
        );
    } else if trend == WeightTrend::Stable && records.len() >= 4 {
        let span = current.date - records[3].date;
        if span > settings.stagnation_window() {
            let spread = weight_spread(&records[..4]);
            if spread < STAGNATION_SPREAD_GRAMS {
                analysis.flag(
                    WeightAlertKind::Stagnation,
                    format!(
                        "Weight stagnant for {} days (variation: {:.1}g)",
                        whole_days(span),
                        spread
                    ),
                );
            }
        }
    }

    Some(analysis)
}

impl WeightAnalysis {
    fn flag(&mut self, kind: WeightAlertKind, reason: String) {
        self.alert = true;
        self.alert_kind = Some(kind);
        self.alert_reason = reason;
    }
}

/// Turns a flagged weight analysis into an alert candidate.
pub fn weight_alert(analysis: &WeightAnalysis) -> Option<AlertCandidate> {
    let kind = analysis.alert_kind.filter(|_| analysis.alert)?;
    let (notification_type, priority) = match kind {
        WeightAlertKind::SignificantDrop => {
            (NotificationType::WeightDrop, NotificationPriority::Critical)
        }
        WeightAlertKind::DecliningTrend | WeightAlertKind::Stagnation => (
            NotificationType::WeightStagnation,
            NotificationPriority::Medium,
        ),
    };

    Some(AlertCandidate {
        notification_type,
        priority,
        hedgehog_id: analysis.hedgehog_id,
        therapy_id: None,
        title: format!("Weight alert: {}", analysis.hedgehog_name),
        message: analysis.alert_reason.clone(),
        data: serde_json::to_string(analysis).unwrap_or_else(|_| "{}".to_string()),
        action_url: hedgehog_url(analysis.hedgehog_id),
        action_label: "Check weight".to_string(),
    })
}

/// Flags a hedgehog in care that has not been weighed for
/// `no_weighing_days`. `latest` is the most recent weighing, if any.
pub fn evaluate_missing_weighing(
    hedgehog: &Hedgehog,
    latest: Option<&WeightRecord>,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Option<AlertCandidate> {
    if !hedgehog.is_in_care() {
        return None;
    }

    let threshold = now - settings.no_weighing_window();
    let days_since = match latest {
        Some(record) if record.date >= threshold => return None,
        Some(record) => days_between(now, record.date),
        None => days_between(now, hedgehog.arrival_date),
    };

    Some(AlertCandidate {
        notification_type: NotificationType::NoWeighing,
        priority: NotificationPriority::Medium,
        hedgehog_id: hedgehog.id,
        therapy_id: None,
        title: format!("Missing weighing: {}", hedgehog.name),
        message: format!("{} has not been weighed for {} days", hedgehog.name, days_since),
        data: json!({ "days_since": days_since }).to_string(),
        action_url: hedgehog_url(hedgehog.id),
        action_label: "Add weighing".to_string(),
    })
}

/// Builds the snapshot row for one active therapy.
pub fn analyze_therapy(
    entry: &TherapyWithHedgehog,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> TherapyAnalysis {
    let therapy = &entry.therapy;
    let days_active = days_between(now, therapy.start_date);
    let days_until_end = therapy.end_date.map(|end| days_between(end, now));

    let alert_reason = match (therapy.end_date, days_until_end) {
        (Some(end), Some(days)) if end < now => {
            Some(format!("Therapy overdue by {} days", -days))
        }
        (Some(_), Some(days)) if days <= i64::from(settings.therapy_expiring_days) => {
            Some(format!("Therapy ends in {} days", days))
        }
        (None, _) if days_active > LONG_RUNNING_THERAPY_DAYS => Some(format!(
            "Therapy active for {} days without an end date",
            days_active
        )),
        _ => None,
    };

    TherapyAnalysis {
        therapy_id: therapy.id,
        hedgehog_id: therapy.hedgehog_id,
        hedgehog_name: entry.hedgehog_display_name().to_string(),
        therapy_name: therapy.name.clone(),
        start_date: therapy.start_date,
        end_date: therapy.end_date,
        days_active,
        days_until_end,
        status: therapy.status.to_string(),
        alert: alert_reason.is_some(),
        alert_reason: alert_reason.unwrap_or_default(),
    }
}

/// Alert-first, then largest loss first.
pub fn sort_weight_analyses(analyses: &mut [WeightAnalysis]) {
    analyses.sort_by(|a, b| {
        b.alert
            .cmp(&a.alert)
            .then_with(|| a.weight_change.total_cmp(&b.weight_change))
    });
}

/// Alert-first, then soonest end first. Open-ended therapies sort as zero days.
pub fn sort_therapy_analyses(analyses: &mut [TherapyAnalysis]) {
    analyses.sort_by(|a, b| match b.alert.cmp(&a.alert) {
        Ordering::Equal => a
            .days_until_end
            .unwrap_or(0)
            .cmp(&b.days_until_end.unwrap_or(0)),
        other => other,
    });
}
