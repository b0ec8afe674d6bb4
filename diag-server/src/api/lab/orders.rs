//! Orders assigned to the caller's lab, status updates and report upload

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    LabOrder, LabStats, OrderDetail, OrderStatus, Report, UpdateStatusRequest, UploadReportRequest,
};

use crate::api::ApiResult;
use crate::auth::LabStaff;
use crate::db::stats;
use crate::services::{views, workflow};
use crate::state::AppState;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_url};

/// GET /api/lab/orders - every order assigned to the lab, newest first
pub async fn list(State(state): State<AppState>, staff: LabStaff) -> ApiResult<Vec<LabOrder>> {
    Ok(Json(views::lab_orders(&state.pool, staff.lab_id, None).await?))
}

/// GET /api/lab/orders/pending - assigned but not yet collected
pub async fn pending(State(state): State<AppState>, staff: LabStaff) -> ApiResult<Vec<LabOrder>> {
    Ok(Json(
        views::lab_orders(&state.pool, staff.lab_id, Some(OrderStatus::Assigned)).await?,
    ))
}

/// PUT /api/lab/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    staff: LabStaff,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<OrderDetail> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    workflow::lab_update_status(
        &state.pool,
        staff.lab_id,
        id,
        payload.status,
        payload.notes.as_deref().filter(|n| !n.trim().is_empty()),
        staff.user.id,
    )
    .await?;

    let detail = views::order_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(detail))
}

/// POST /api/lab/reports
pub async fn upload_report(
    State(state): State<AppState>,
    staff: LabStaff,
    Json(payload): Json<UploadReportRequest>,
) -> ApiResult<Report> {
    let file_url = payload.file_url.trim();
    validate_url(file_url, "file_url")?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let report = workflow::upload_report(
        &state.pool,
        staff.lab_id,
        payload.order_item_id,
        file_url,
        payload.notes.as_deref().filter(|n| !n.trim().is_empty()),
    )
    .await?;
    Ok(Json(report))
}

/// GET /api/lab/stats
pub async fn stats(State(state): State<AppState>, staff: LabStaff) -> ApiResult<LabStats> {
    let now = shared::util::now_millis();
    Ok(Json(stats::lab_stats(&state.pool, staff.lab_id, now).await?))
}
