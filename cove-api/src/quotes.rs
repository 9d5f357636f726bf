use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use cove_quote::{BookingMode, Cart, CartLine, QuoteResult};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub lines: Vec<CartLine>,
    pub start: DateTime<Utc>,
    pub mode: BookingMode,
    pub customer_id: Option<String>,
    pub coupon_code: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/quotes", post(create_quote))
}

/// POST /v1/quotes
/// Price a candidate cart. Read-only; an invalid coupon degrades to a
/// note on the quote rather than an error.
async fn create_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResult>, AppError> {
    let cart = Cart::new(req.lines);
    let quote = state
        .quotes
        .quote(
            &cart,
            req.start,
            req.mode,
            req.customer_id,
            req.coupon_code.as_deref(),
        )
        .await?;

    Ok(Json(quote))
}
