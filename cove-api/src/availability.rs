use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use cove_booking::ReleaseEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Instant to evaluate; defaults to now
    pub at: Option<DateTime<Utc>>,
    /// Cap on the number of release events returned
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub resource_id: Uuid,
    pub at: DateTime<Utc>,
    pub free_units: i32,
    pub next_releases: Vec<ReleaseEvent>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/availability/{resource_id}", get(get_availability))
}

/// GET /v1/availability/{resource_id}
/// Free units at an instant plus the upcoming release timeline.
async fn get_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let at = query.at.unwrap_or_else(Utc::now);
    let calculator = state.admission.availability();

    let free_units = calculator.free_units_at(resource_id, at).await?;
    let next_releases = calculator
        .next_release_events(resource_id, at, query.limit)
        .await?;

    Ok(Json(AvailabilityResponse {
        resource_id,
        at,
        free_units,
        next_releases,
    }))
}
