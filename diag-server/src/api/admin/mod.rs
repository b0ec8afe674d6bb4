//! Admin API: labs, catalog, orders and dashboard counters
//!
//! Every handler takes [`AdminUser`](crate::auth::AdminUser), so a caller
//! without the admin role is rejected before the handler body runs.

mod catalog;
mod labs;
mod orders;

pub(crate) use labs::validate_lab_update;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<AppState> {
    let lab_routes = Router::new()
        .route("/labs", get(labs::list).post(labs::create))
        .route(
            "/labs/{id}",
            get(labs::get_by_id).put(labs::update).delete(labs::delete),
        );

    let catalog_routes = Router::new()
        .route("/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/tests", get(catalog::list_tests).post(catalog::create_test))
        .route("/packages", get(catalog::list_packages).post(catalog::create_package));

    let order_routes = Router::new()
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::get_by_id))
        .route("/orders/{id}/status", put(orders::update_status))
        .route("/orders/{id}/assign", put(orders::assign_lab))
        .route("/stats", get(orders::stats));

    lab_routes.merge(catalog_routes).merge(order_routes)
}
