//! Therapy domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Placeholder rendered when a referenced record no longer exists.
pub const MISSING_REFERENCE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TherapyStatus {
    #[default]
    Active,
    Completed,
    Suspended,
}

impl TherapyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TherapyStatus::Active => "active",
            TherapyStatus::Completed => "completed",
            TherapyStatus::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for TherapyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TherapyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TherapyStatus::Active),
            "completed" => Ok(TherapyStatus::Completed),
            "suspended" => Ok(TherapyStatus::Suspended),
            other => Err(format!("Unknown therapy status: {}", other)),
        }
    }
}

/// A course of treatment for one hedgehog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Therapy {
    pub id: i64,
    pub hedgehog_id: i64,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: TherapyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Therapy {
    pub fn is_active(&self) -> bool {
        self.status == TherapyStatus::Active
    }
}

/// Therapy joined with the name of its hedgehog, if the hedgehog still exists.
#[derive(Debug, Clone, Serialize)]
pub struct TherapyWithHedgehog {
    #[serde(flatten)]
    pub therapy: Therapy,
    pub hedgehog_name: Option<String>,
}

impl TherapyWithHedgehog {
    pub fn hedgehog_display_name(&self) -> &str {
        self.hedgehog_name.as_deref().unwrap_or(MISSING_REFERENCE)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTherapyRequest {
    pub hedgehog_id: i64,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Defaults to the time of the request.
    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: TherapyStatus,
}

impl CreateTherapyRequest {
    /// Returns false when the end date precedes the start date.
    pub fn has_consistent_dates(&self, default_start: DateTime<Utc>) -> bool {
        let start = self.start_date.unwrap_or(default_start);
        self.end_date.map_or(true, |end| end >= start)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTherapyRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    pub status: Option<TherapyStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTherapiesQuery {
    pub hedgehog_id: Option<i64>,
}
