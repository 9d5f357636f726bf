use axum::{
    extract::{Path, State},
    routing::post,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use cove_core::payment::PaymentProof;
use cove_quote::{BookingMode, Cart, CartLine};
use serde::Deserialize;
use uuid::Uuid;

use cove_core::identity::Role;

use crate::bookings::{require_expected_currency, BookingResponse};
use crate::{error::AppError, middleware::auth::Claims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateHoldRequest {
    pub lines: Vec<CartLine>,
    pub start: DateTime<Utc>,
    pub mode: BookingMode,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmHoldRequest {
    pub payment: PaymentProof,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(create_hold))
        .route("/v1/holds/{id}/confirm", post(confirm_hold))
}

/// POST /v1/holds
/// Reserve units without payment for the configured TTL.
async fn create_hold(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateHoldRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let cart = Cart::new(req.lines);
    let reservation = state
        .admission
        .place_hold(
            &cart,
            req.start,
            req.mode,
            claims.sub,
            None,
            req.coupon_code.as_deref(),
        )
        .await?;

    Ok(Json(reservation.into()))
}

/// POST /v1/holds/{id}/confirm
/// Promote a hold to a confirmed reservation once payment is captured.
/// Owner or staff only.
async fn confirm_hold(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmHoldRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    require_expected_currency(&state, &req.payment)?;

    let hold = state
        .ledger
        .get(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Reservation not found: {}", id)))?;

    let is_staff = Role::parse(&claims.role).map(|r| r.is_staff()).unwrap_or(false);
    if hold.customer_id != claims.sub && !is_staff {
        return Err(AppError::AuthorizationError(
            "Not your reservation".to_string(),
        ));
    }

    let reservation = state.admission.confirm_hold(id, &req.payment).await?;
    Ok(Json(reservation.into()))
}
