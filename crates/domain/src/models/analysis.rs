//! Weight and therapy analysis snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative weight direction derived from averaged slopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightTrend {
    InsufficientData,
    Improving,
    Stable,
    Declining,
    Critical,
}

impl WeightTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightTrend::InsufficientData => "insufficient_data",
            WeightTrend::Improving => "improving",
            WeightTrend::Stable => "stable",
            WeightTrend::Declining => "declining",
            WeightTrend::Critical => "critical",
        }
    }
}

impl std::fmt::Display for WeightTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which weight rule fired for a hedgehog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightAlertKind {
    SignificantDrop,
    DecliningTrend,
    Stagnation,
}

/// Per-hedgehog weight snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightAnalysis {
    pub hedgehog_id: i64,
    pub hedgehog_name: String,
    pub current_weight: f64,
    pub previous_weight: f64,
    pub weight_change: f64,
    pub days_since_weigh: i64,
    pub last_weigh_date: DateTime<Utc>,
    pub trend: WeightTrend,
    pub alert: bool,
    pub alert_reason: String,
    #[serde(skip)]
    pub alert_kind: Option<WeightAlertKind>,
}

/// Per-therapy snapshot for active therapies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TherapyAnalysis {
    pub therapy_id: i64,
    pub hedgehog_id: i64,
    pub hedgehog_name: String,
    pub therapy_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub days_active: i64,
    /// Negative when overdue; absent for open-ended therapies.
    pub days_until_end: Option<i64>,
    pub status: String,
    pub alert: bool,
    pub alert_reason: String,
}
