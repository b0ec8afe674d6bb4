//! Order status workflow and lab assignment
//!
//! Every status change writes the order row and exactly one history row in
//! the same transaction. Admin transitions are unconstrained; labs may only
//! move their own orders into the statuses they work on.

use shared::error::{AppError, ErrorCode};
use shared::models::{OrderItemStatus, OrderStatus, Report};
use sqlx::SqlitePool;

use crate::db::{labs, orders};
use crate::error::ServiceResult;

/// Admin: set any status on any order
pub async fn admin_update_status(
    pool: &SqlitePool,
    order_id: i64,
    status: OrderStatus,
    notes: Option<&str>,
    actor_id: i64,
) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if !orders::set_status(&mut tx, order_id, status, now).await? {
        return Err(AppError::new(ErrorCode::OrderNotFound).into());
    }
    orders::insert_history(&mut tx, order_id, status, Some(actor_id), notes, now).await?;
    tx.commit().await?;

    tracing::info!(order_id, status = %status, actor_id, "Order status updated by admin");
    Ok(())
}

/// Admin: hand the order to a lab. The status becomes `assigned` whatever
/// it was before.
pub async fn assign_lab(
    pool: &SqlitePool,
    order_id: i64,
    lab_id: i64,
    actor_id: i64,
) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let Some(lab_name) = labs::find_name(&mut tx, lab_id).await? else {
        return Err(AppError::new(ErrorCode::LabNotFound).into());
    };
    if !orders::set_assignee(&mut tx, order_id, lab_id, now).await? {
        return Err(AppError::new(ErrorCode::OrderNotFound).into());
    }
    let notes = format!("Assigned to {lab_name}");
    orders::insert_history(
        &mut tx,
        order_id,
        OrderStatus::Assigned,
        Some(actor_id),
        Some(&notes),
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(order_id, lab_id, actor_id, "Order assigned to lab");
    Ok(())
}

/// Lab: move an order assigned to `lab_id` into one of the lab statuses.
/// Ordering between those statuses is not enforced.
pub async fn lab_update_status(
    pool: &SqlitePool,
    lab_id: i64,
    order_id: i64,
    status: OrderStatus,
    notes: Option<&str>,
    actor_id: i64,
) -> ServiceResult<()> {
    if !status.is_lab_settable() {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Labs cannot set status '{status}'"),
        )
        .with_detail("status", status.as_str())
        .into());
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let order = orders::find(&mut tx, order_id).await?;
    if order.and_then(|o| o.assigned_lab_id) != Some(lab_id) {
        crate::security_log!(WARN, "lab_order_denied", lab_id, order_id, user_id = actor_id);
        return Err(AppError::new(ErrorCode::OrderNotAssignedToLab).into());
    }

    orders::set_status(&mut tx, order_id, status, now).await?;
    orders::insert_history(&mut tx, order_id, status, Some(actor_id), notes, now).await?;
    tx.commit().await?;

    tracing::info!(order_id, lab_id, status = %status, "Order status updated by lab");
    Ok(())
}

/// Lab: attach a report to an item of one of its orders and mark the item
/// reported
pub async fn upload_report(
    pool: &SqlitePool,
    lab_id: i64,
    order_item_id: i64,
    file_url: &str,
    notes: Option<&str>,
) -> ServiceResult<Report> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let Some(order_id) = orders::item_order_for_lab(&mut tx, order_item_id, lab_id).await? else {
        crate::security_log!(WARN, "lab_item_denied", lab_id, order_item_id);
        return Err(AppError::new(ErrorCode::ItemNotAssignedToLab).into());
    };

    let report = orders::insert_report(&mut tx, order_item_id, file_url, notes, lab_id, now).await?;
    orders::set_item_status(&mut tx, order_item_id, OrderItemStatus::Reported).await?;
    tx.commit().await?;

    tracing::info!(order_id, order_item_id, lab_id, "Report uploaded");
    Ok(report)
}
