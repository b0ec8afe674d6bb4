//! Authentication API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::{sign_in_rate_limit, sign_up_rate_limit};
use crate::state::AppState;

/// - /api/auth/sign-up, /api/auth/sign-in: public, rate limited per IP
/// - /api/auth/sign-out, /api/auth/me: signed in
pub fn router(state: &AppState) -> Router<AppState> {
    let sign_up = Router::new()
        .route("/api/auth/sign-up", post(handler::sign_up))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            sign_up_rate_limit,
        ));

    let sign_in = Router::new()
        .route("/api/auth/sign-in", post(handler::sign_in))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            sign_in_rate_limit,
        ));

    Router::new()
        .route("/api/auth/sign-out", post(handler::sign_out))
        .route("/api/auth/me", get(handler::me))
        .merge(sign_up)
        .merge(sign_in)
}
