//! Patient API: bookings, reports, family, addresses, profile
//!
//! Any signed-in user may use these routes; every query is scoped to the
//! caller's own rows.

mod orders;
mod profile;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api", routes())
}

fn routes() -> Router<AppState> {
    let order_routes = Router::new()
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/{id}", get(orders::get_by_id))
        .route("/reports", get(orders::reports))
        .route("/dashboard", get(orders::dashboard));

    let profile_routes = Router::new()
        .route("/family", get(profile::list_family).post(profile::create_family_member))
        .route("/family/{id}", delete(profile::delete_family_member))
        .route("/addresses", get(profile::list_addresses).post(profile::create_address))
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/invitations", get(profile::list_invitations))
        .route("/invitations/{id}/accept", post(profile::accept_invitation));

    order_routes.merge(profile_routes)
}
