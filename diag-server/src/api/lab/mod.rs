//! Lab partner API
//!
//! Handlers take [`LabStaff`](crate::auth::LabStaff), which resolves the
//! caller's lab from their membership. Writes to the price list, the team
//! and the settings additionally require an owner or admin role.

mod orders;
mod prices;
mod team;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/lab", routes())
}

fn routes() -> Router<AppState> {
    let order_routes = Router::new()
        .route("/orders", get(orders::list))
        .route("/orders/pending", get(orders::pending))
        .route("/orders/{id}/status", put(orders::update_status))
        .route("/reports", post(orders::upload_report))
        .route("/stats", get(orders::stats));

    let price_routes = Router::new()
        .route("/tests", get(prices::list).post(prices::upsert))
        .route("/tests/{id}", put(prices::update).delete(prices::delete));

    let team_routes = Router::new()
        .route("/team", get(team::members))
        .route("/invitations", get(team::list_invitations).post(team::invite))
        .route("/invitations/{id}", delete(team::cancel_invitation))
        .route("/settings", get(team::settings).put(team::update_settings));

    order_routes.merge(price_routes).merge(team_routes)
}
