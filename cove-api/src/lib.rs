use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod availability;
pub mod bookings;
pub mod error;
pub mod holds;
pub mod middleware;
pub mod quotes;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let public = Router::new()
        .merge(auth::routes())
        .merge(availability::routes())
        .merge(quotes::routes());

    let customer = Router::new()
        .merge(bookings::routes())
        .merge(holds::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::customer_auth_middleware,
        ));

    let staff = Router::new()
        .merge(bookings::staff_routes())
        .merge(admin::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::staff_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(customer)
        .merge(staff)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
