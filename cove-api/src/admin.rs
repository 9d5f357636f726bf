use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use cove_catalog::{LocationSchedule, Resource, ResourceCategory};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub location_id: Uuid,
    pub category: ResourceCategory,
    pub name: String,
    pub hourly_rate_cents: i64,
    pub stock: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/resources", post(create_resource))
        .route("/v1/admin/resources/{location_id}", get(list_resources))
        .route("/v1/admin/schedules", post(upsert_schedule))
}

/// POST /v1/admin/resources
async fn create_resource(
    State(state): State<AppState>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<Json<Resource>, AppError> {
    let resource = Resource::new(
        req.location_id,
        req.category,
        req.name,
        req.hourly_rate_cents,
        req.stock,
    );

    state
        .catalog
        .upsert_resource(&resource)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(resource_id = %resource.id, "Resource created");
    Ok(Json(resource))
}

/// GET /v1/admin/resources/{location_id}
async fn list_resources(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<Json<Vec<Resource>>, AppError> {
    let resources = state
        .catalog
        .list_resources(location_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(resources))
}

/// POST /v1/admin/schedules
async fn upsert_schedule(
    State(state): State<AppState>,
    Json(schedule): Json<LocationSchedule>,
) -> Result<Json<LocationSchedule>, AppError> {
    state
        .schedules
        .upsert_schedule(&schedule)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(location_id = %schedule.location_id, "Schedule upserted");
    Ok(Json(schedule))
}
