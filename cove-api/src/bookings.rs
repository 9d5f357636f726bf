use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use cove_booking::{MonetaryTotals, Reservation, ReservationLineItem, ReservationStatus};
use cove_core::identity::Role;
use cove_core::payment::PaymentProof;
use cove_quote::{BookingMode, Cart, CartLine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub lines: Vec<CartLine>,
    pub start: DateTime<Utc>,
    pub mode: BookingMode,
    pub coupon_code: Option<String>,
    pub payment: PaymentProof,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEvent {
    CheckIn,
    CheckOut,
    Cancel,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub event: TransitionEvent,
    /// Balance settlement for advance bookings at check-in
    pub payment: Option<PaymentProof>,
    /// Actual return instant at check-out; defaults to now
    pub returned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub status: ReservationStatus,
    pub customer_id: String,
    pub location_id: Uuid,
    pub line_items: Vec<ReservationLineItem>,
    pub totals: MonetaryTotals,
    pub amount_paid_cents: i64,
    pub outstanding_cents: i64,
    pub mode: BookingMode,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub deposit_refunded: bool,
}

impl From<Reservation> for BookingResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            status: r.status,
            customer_id: r.customer_id,
            location_id: r.location_id,
            line_items: r.line_items,
            totals: r.totals,
            amount_paid_cents: r.amount_paid_cents,
            outstanding_cents: r.outstanding_cents,
            mode: r.mode,
            hold_expires_at: r.hold_expires_at,
            completed_at: r.completed_at,
            deposit_refunded: r.deposit_refunded,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
}

pub fn staff_routes() -> Router<AppState> {
    Router::new().route("/v1/bookings/{id}/transition", post(transition_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// Payment proofs must be denominated in the configured currency.
pub fn require_expected_currency(
    state: &AppState,
    payment: &PaymentProof,
) -> Result<(), AppError> {
    let expected = &state.business_rules.currency;
    if payment.currency != *expected {
        return Err(AppError::ValidationError(format!(
            "Payment currency {} does not match {}",
            payment.currency, expected
        )));
    }
    Ok(())
}

/// POST /v1/bookings
/// Admit a cart as a confirmed reservation. The payment proof must cover
/// the due-now amount for the chosen mode.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    require_expected_currency(&state, &req.payment)?;

    let cart = Cart::new(req.lines);
    let seller_id = match Role::parse(&claims.role) {
        Some(Role::Seller) => Some(claims.sub.clone()),
        _ => None,
    };

    let reservation = state
        .admission
        .admit(
            &cart,
            req.start,
            req.mode,
            claims.sub,
            seller_id,
            req.coupon_code.as_deref(),
            &req.payment,
        )
        .await?;

    Ok(Json(reservation.into()))
}

/// GET /v1/bookings/{id}
/// Owner or staff only.
async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let reservation = state
        .ledger
        .get(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Reservation not found: {}", id)))?;

    let is_staff = Role::parse(&claims.role).map(|r| r.is_staff()).unwrap_or(false);
    if reservation.customer_id != claims.sub && !is_staff {
        return Err(AppError::AuthorizationError(
            "Not your reservation".to_string(),
        ));
    }

    Ok(Json(reservation.into()))
}

/// POST /v1/bookings/{id}/transition
/// Staff-driven lifecycle events: check_in, check_out, cancel.
async fn transition_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    if let Some(payment) = &req.payment {
        require_expected_currency(&state, payment)?;
    }

    let reservation = match req.event {
        TransitionEvent::CheckIn => {
            state
                .lifecycle
                .check_in(id, req.payment.as_ref())
                .await?
        }
        TransitionEvent::CheckOut => {
            let returned_at = req.returned_at.unwrap_or_else(Utc::now);
            state.lifecycle.check_out(id, returned_at).await?
        }
        TransitionEvent::Cancel => state.lifecycle.cancel(id).await?,
    };

    Ok(Json(reservation.into()))
}
