//! Weight record domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single weighing of a hedgehog, in grams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightRecord {
    pub id: i64,
    pub hedgehog_id: i64,
    pub weight: f64,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWeightRecordRequest {
    pub hedgehog_id: i64,

    #[validate(custom(function = "shared::validation::validate_weight_grams"))]
    pub weight: f64,

    /// Defaults to the time of the request.
    pub date: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateWeightRecordRequest {
    #[validate(custom(function = "shared::validation::validate_weight_grams"))]
    pub weight: Option<f64>,

    pub date: Option<DateTime<Utc>>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListWeightRecordsQuery {
    pub hedgehog_id: Option<i64>,
}
