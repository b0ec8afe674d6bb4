//! Lab price list

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{LabTest, LabTestUpdate, LabTestUpsert};

use crate::api::ApiResult;
use crate::auth::LabStaff;
use crate::db::{catalog, lab_tests};
use crate::state::AppState;
use crate::utils::validation::validate_price;

/// GET /api/lab/tests
pub async fn list(State(state): State<AppState>, staff: LabStaff) -> ApiResult<Vec<LabTest>> {
    Ok(Json(lab_tests::list_for_lab(&state.pool, staff.lab_id).await?))
}

/// POST /api/lab/tests - add an offering or reprice an existing one
pub async fn upsert(
    State(state): State<AppState>,
    staff: LabStaff,
    Json(payload): Json<LabTestUpsert>,
) -> ApiResult<LabTest> {
    staff.require_manager()?;
    validate_price(payload.price, "price")?;

    if catalog::find_test(&state.pool, payload.test_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::TestNotFound)
            .with_detail("test_id", payload.test_id)
            .into());
    }

    let offering = lab_tests::upsert(
        &state.pool,
        staff.lab_id,
        payload.test_id,
        payload.price,
        payload.is_available,
        shared::util::now_millis(),
    )
    .await?;
    tracing::info!(
        lab_id = staff.lab_id,
        test_id = payload.test_id,
        price = payload.price,
        "Lab price set"
    );
    Ok(Json(offering))
}

/// PUT /api/lab/tests/{id}
pub async fn update(
    State(state): State<AppState>,
    staff: LabStaff,
    Path(id): Path<i64>,
    Json(payload): Json<LabTestUpdate>,
) -> ApiResult<LabTest> {
    staff.require_manager()?;
    validate_price(payload.price, "price")?;

    let offering = lab_tests::update_for_lab(
        &state.pool,
        id,
        staff.lab_id,
        payload.price,
        payload.is_available,
        shared::util::now_millis(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::LabTestNotFound))?;
    Ok(Json(offering))
}

/// DELETE /api/lab/tests/{id}
pub async fn delete(
    State(state): State<AppState>,
    staff: LabStaff,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    staff.require_manager()?;
    if !lab_tests::delete_for_lab(&state.pool, id, staff.lab_id).await? {
        return Err(AppError::new(ErrorCode::LabTestNotFound).into());
    }
    Ok(Json(true))
}
