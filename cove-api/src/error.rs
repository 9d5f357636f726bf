use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cove_booking::{AdmissionError, AvailabilityError, LifecycleError};
use cove_quote::QuoteError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    PaymentRequiredError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::PaymentRequiredError(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl From<AdmissionError> for AppError {
    fn from(err: AdmissionError) -> Self {
        match &err {
            AdmissionError::Validation(_) => AppError::ValidationError(err.to_string()),
            AdmissionError::ResourceNotFound(_) | AdmissionError::ReservationNotFound(_) => {
                AppError::NotFoundError(err.to_string())
            }
            AdmissionError::InsufficientStock { .. }
            | AdmissionError::ScheduleConflict { .. }
            | AdmissionError::BeforeOpening { .. }
            | AdmissionError::LocationClosed { .. }
            | AdmissionError::HoldExpired(_)
            | AdmissionError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
            AdmissionError::PaymentInsufficient { .. } | AdmissionError::PaymentUnverified => {
                AppError::PaymentRequiredError(err.to_string())
            }
            AdmissionError::Infrastructure(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        match &err {
            QuoteError::Validation(_) | QuoteError::ResourceInactive(_) => {
                AppError::ValidationError(err.to_string())
            }
            QuoteError::ResourceNotFound(_) => AppError::NotFoundError(err.to_string()),
            QuoteError::Infrastructure(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match &err {
            AvailabilityError::ResourceNotFound(_) => AppError::NotFoundError(err.to_string()),
            AvailabilityError::Infrastructure(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match &err {
            LifecycleError::ReservationNotFound(_) => AppError::NotFoundError(err.to_string()),
            LifecycleError::InvalidTransition { .. }
            | LifecycleError::ConcurrentModification(_) => AppError::ConflictError(err.to_string()),
            LifecycleError::PaymentInsufficient { .. } => {
                AppError::PaymentRequiredError(err.to_string())
            }
            LifecycleError::Infrastructure(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}
