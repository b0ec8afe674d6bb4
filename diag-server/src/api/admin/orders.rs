//! Order administration and dashboard counters

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AdminStats, AssignLabRequest, OrderDetail, OrderStatus, OrderSummary, UpdateStatusRequest,
};

use crate::api::ApiResult;
use crate::auth::AdminUser;
use crate::db::{orders, stats};
use crate::services::{views, workflow};
use crate::state::AppState;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListOrdersQuery {
    /// (page, per_page), both clamped to sane values
    fn paging(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page)
    }

    /// Rows to skip; saturates instead of overflowing on huge pages
    fn offset(&self) -> i64 {
        let (page, per_page) = self.paging();
        (page - 1).saturating_mul(per_page)
    }
}

#[derive(Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// GET /api/admin/orders?status=&page=&per_page=
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<OrderPage> {
    let (page, per_page) = query.paging();
    let (orders, total) =
        orders::list_all(&state.pool, query.status, per_page, query.offset()).await?;
    Ok(Json(OrderPage {
        orders,
        total,
        page,
        per_page,
    }))
}

/// GET /api/admin/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = views::order_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(detail))
}

/// PUT /api/admin/orders/{id}/status - any status, no transition check
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<OrderDetail> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    workflow::admin_update_status(
        &state.pool,
        id,
        payload.status,
        payload.notes.as_deref().filter(|n| !n.trim().is_empty()),
        admin.id,
    )
    .await?;
    get_by_id(State(state), AdminUser(admin), Path(id)).await
}

/// PUT /api/admin/orders/{id}/assign
pub async fn assign_lab(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<AssignLabRequest>,
) -> ApiResult<OrderDetail> {
    workflow::assign_lab(&state.pool, id, payload.lab_id, admin.id).await?;
    get_by_id(State(state), AdminUser(admin), Path(id)).await
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<AdminStats> {
    Ok(Json(stats::admin_stats(&state.pool).await?))
}
