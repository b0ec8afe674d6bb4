//! HTTP API
//!
//! One router per area, merged here:
//! - `/health`, `/api/public/*`: no session
//! - `/api/auth/*`: sign-up, sign-in (rate limited), sign-out, session
//! - `/api/admin/*`: admin role
//! - `/api/lab/*`: lab members
//! - everything else under `/api`: any signed-in user

pub mod admin;
pub mod auth;
pub mod health;
pub mod lab;
pub mod patient;
pub mod public;

use axum::Router;
use http::HeaderName;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, ServiceError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// All routes without the tower-http layers; `state` feeds the rate limiters
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(public::router())
        .merge(auth::router(state))
        .merge(admin::router())
        .merge(lab::router())
        .merge(patient::router())
}

/// Fully layered application, used by the server and by router tests
pub fn create_router(state: AppState) -> Router {
    build_router(&state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Outermost last: the id is set before propagation sees the request
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        .with_state(state)
}
