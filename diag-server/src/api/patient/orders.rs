//! Patient bookings and reports

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CreateOrderRequest, CreateOrderResponse, OrderDetail, OrderSummary, PatientDashboard,
    ReportSummary,
};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::db::{orders, stats};
use crate::services::{ordering, views};
use crate::state::AppState;

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<CreateOrderResponse> {
    let today = chrono::Utc::now().date_naive();
    Ok(Json(
        ordering::create_order(&state.pool, user.id, &payload, today).await?,
    ))
}

/// GET /api/orders - newest first
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<OrderSummary>> {
    Ok(Json(orders::list_for_user(&state.pool, user.id, None).await?))
}

/// GET /api/orders/{id}
///
/// Someone else's order answers exactly like a missing one.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = views::order_detail(&state.pool, id)
        .await?
        .filter(|d| d.order.user_id == user.id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(detail))
}

/// GET /api/reports
pub async fn reports(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<ReportSummary>> {
    Ok(Json(orders::reports_for_user(&state.pool, user.id).await?))
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<PatientDashboard> {
    Ok(Json(stats::patient_dashboard(&state.pool, user.id).await?))
}
