//! Catalog administration: categories, tests, packages

use axum::{Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Package, PackageCreate, TestCategory, TestCategoryCreate, TestCreate, TestWithCategory,
};

use crate::api::ApiResult;
use crate::auth::AdminUser;
use crate::db::catalog;
use crate::error::conflict_or_db;
use crate::services;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_price,
    validate_required_text, validate_slug,
};

fn validate_test(data: &TestCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.code, "code", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.turnaround_time, "turnaround_time", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.sample_type, "sample_type", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

fn validate_package(data: &PackageCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_slug(&data.slug, "slug")?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_price(data.price, "price")?;
    if let Some(discount) = data.discount_price {
        validate_price(discount, "discount_price")?;
    }
    validate_optional_text(&data.recommended_for, "recommended_for", MAX_NAME_LEN)?;
    if data.test_ids.is_empty() {
        return Err(AppError::invalid_field("test_ids", "Select at least one test"));
    }
    Ok(())
}

/// GET /api/admin/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Vec<TestCategory>> {
    Ok(Json(catalog::list_categories(&state.pool).await?))
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<TestCategoryCreate>,
) -> ApiResult<TestCategory> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_slug(&payload.slug, "slug")?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let category = catalog::create_category(&state.pool, &payload, shared::util::now_millis())
        .await
        .map_err(|e| conflict_or_db(e, ErrorCode::CategorySlugExists))?;
    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok(Json(category))
}

/// GET /api/admin/tests - newest first, with category names
pub async fn list_tests(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Vec<TestWithCategory>> {
    Ok(Json(catalog::list_tests(&state.pool).await?))
}

/// POST /api/admin/tests
pub async fn create_test(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(mut payload): Json<TestCreate>,
) -> ApiResult<TestWithCategory> {
    validate_test(&payload)?;
    payload.code = payload.code.trim().to_string();

    if !catalog::category_exists(&state.pool, payload.category_id).await? {
        return Err(AppError::new(ErrorCode::CategoryNotFound)
            .with_detail("category_id", payload.category_id)
            .into());
    }

    let id = catalog::create_test(&state.pool, &payload, shared::util::now_millis())
        .await
        .map_err(|e| conflict_or_db(e, ErrorCode::TestCodeExists))?;
    tracing::info!(test_id = id, code = %payload.code, "Test created");

    let test = catalog::find_test(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TestNotFound))?;
    Ok(Json(test))
}

/// GET /api/admin/packages
pub async fn list_packages(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Vec<Package>> {
    Ok(Json(catalog::list_packages(&state.pool).await?))
}

/// POST /api/admin/packages
pub async fn create_package(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<PackageCreate>,
) -> ApiResult<Package> {
    validate_package(&payload)?;
    let id = services::catalog::create_package(&state.pool, &payload).await?;

    let package = catalog::list_packages(&state.pool)
        .await?
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::new(ErrorCode::PackageNotFound))?;
    Ok(Json(package))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(test_ids: Vec<i64>) -> PackageCreate {
        PackageCreate {
            name: "Diabetes Screen".into(),
            slug: "diabetes-screen".into(),
            description: None,
            price: 1500.0,
            discount_price: Some(-1.0),
            is_popular: false,
            recommended_for: None,
            test_ids,
        }
    }

    #[test]
    fn test_package_validation() {
        let err = validate_package(&package(vec![1])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let mut empty = package(vec![]);
        empty.discount_price = None;
        let err = validate_package(&empty).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap()["field"], "test_ids");
    }

    #[test]
    fn test_test_validation() {
        let data = TestCreate {
            name: " ".into(),
            code: "CBC001".into(),
            category_id: 1,
            description: None,
            turnaround_time: None,
            fasting_required: false,
            sample_type: None,
        };
        assert!(validate_test(&data).is_err());
    }
}
