use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::issue_token, state::AppState};

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/guest", post(login_guest))
}

async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let token = issue_token(
        &format!("guest-{}", Uuid::new_v4()),
        "customer",
        &state.auth.secret,
        state.auth.expiration,
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
