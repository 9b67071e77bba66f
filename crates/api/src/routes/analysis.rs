//! Read-only weight and therapy snapshots.

use axum::{extract::State, Json};
use domain::models::{TherapyAnalysis, WeightAnalysis};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/analysis/weight
pub async fn weight_analysis(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeightAnalysis>>, ApiError> {
    Ok(Json(state.engine.weight_snapshot().await?))
}

/// GET /api/analysis/therapy
pub async fn therapy_analysis(
    State(state): State<AppState>,
) -> Result<Json<Vec<TherapyAnalysis>>, ApiError> {
    Ok(Json(state.engine.therapy_snapshot().await?))
}
