//! Public catalog API (no session)

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/public", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handler::categories))
        .route("/tests", get(handler::tests))
        .route("/packages", get(handler::packages))
}
