//! Hedgehog domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Care status of a hedgehog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HedgehogStatus {
    #[default]
    InCare,
    Recovered,
    Deceased,
    Released,
}

impl HedgehogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HedgehogStatus::InCare => "in_care",
            HedgehogStatus::Recovered => "recovered",
            HedgehogStatus::Deceased => "deceased",
            HedgehogStatus::Released => "released",
        }
    }
}

impl std::fmt::Display for HedgehogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HedgehogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_care" => Ok(HedgehogStatus::InCare),
            "recovered" => Ok(HedgehogStatus::Recovered),
            "deceased" => Ok(HedgehogStatus::Deceased),
            "released" => Ok(HedgehogStatus::Released),
            other => Err(format!("Unknown hedgehog status: {}", other)),
        }
    }
}

/// A hedgehog hosted by the rescue center.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hedgehog {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub arrival_date: DateTime<Utc>,
    pub status: HedgehogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    pub area_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hedgehog {
    /// Whether the hedgehog is in active care and therefore subject to weight checks.
    pub fn is_in_care(&self) -> bool {
        self.status == HedgehogStatus::InCare
    }
}

/// Request payload for registering a hedgehog.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHedgehogRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    /// Defaults to the time of the request.
    pub arrival_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: HedgehogStatus,

    pub release_date: Option<DateTime<Utc>>,

    pub area_id: Option<i64>,
}

/// Request payload for updating a hedgehog (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateHedgehogRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub arrival_date: Option<DateTime<Utc>>,

    pub status: Option<HedgehogStatus>,

    pub release_date: Option<DateTime<Utc>>,

    pub area_id: Option<i64>,
}

/// Query parameters for listing hedgehogs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListHedgehogsQuery {
    pub status: Option<HedgehogStatus>,
}
