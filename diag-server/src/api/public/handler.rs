//! Public catalog handlers

use axum::{Json, extract::State};
use shared::models::{Package, PublicTest, TestCategory};

use crate::api::ApiResult;
use crate::db::catalog;
use crate::state::AppState;

/// GET /api/public/categories
pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<TestCategory>> {
    Ok(Json(catalog::list_categories(&state.pool).await?))
}

/// GET /api/public/tests - each test with its best available lab price
pub async fn tests(State(state): State<AppState>) -> ApiResult<Vec<PublicTest>> {
    Ok(Json(catalog::list_public_tests(&state.pool).await?))
}

/// GET /api/public/packages
pub async fn packages(State(state): State<AppState>) -> ApiResult<Vec<Package>> {
    Ok(Json(catalog::list_packages(&state.pool).await?))
}
