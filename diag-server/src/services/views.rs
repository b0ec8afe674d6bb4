//! Read models assembled from several queries

use shared::models::{LabOrder, OrderDetail, OrderStatus};
use shared::timeline::OrderTimeline;
use sqlx::SqlitePool;

use crate::db::{labs, orders, patients, users};
use crate::error::ServiceResult;

/// Order with customer, address, lab, items (with reports), history and the
/// timeline projection
pub async fn order_detail(pool: &SqlitePool, order_id: i64) -> ServiceResult<Option<OrderDetail>> {
    let order = {
        let mut conn = pool.acquire().await?;
        orders::find(&mut conn, order_id).await?
    };
    let Some(order) = order else {
        return Ok(None);
    };

    let customer_name = users::find_by_id(pool, order.user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_default();
    let address = match order.address_id {
        Some(id) => patients::find_address(pool, id).await?,
        None => None,
    };
    let lab = match order.assigned_lab_id {
        Some(id) => labs::find_by_id(pool, id).await?,
        None => None,
    };
    let items = orders::items_for_order(pool, order.id).await?;
    let history = orders::history(pool, order.id).await?;
    let timeline = OrderTimeline::build(order.status, &history);

    Ok(Some(OrderDetail {
        order,
        customer_name,
        address,
        lab,
        items,
        history,
        timeline,
    }))
}

/// Orders assigned to a lab with their items and collection address
pub async fn lab_orders(
    pool: &SqlitePool,
    lab_id: i64,
    status: Option<OrderStatus>,
) -> ServiceResult<Vec<LabOrder>> {
    let summaries = orders::list_for_lab(pool, lab_id, status).await?;
    let ids: Vec<i64> = summaries.iter().map(|o| o.id).collect();
    let mut items = orders::items_for_orders(pool, &ids).await?;

    let mut result = Vec::with_capacity(summaries.len());
    for order in summaries {
        let address = match order.address_id {
            Some(id) => patients::find_address(pool, id).await?,
            None => None,
        };
        result.push(LabOrder {
            items: items.remove(&order.id).unwrap_or_default(),
            address,
            order,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;
    use crate::services::workflow;

    #[tokio::test]
    async fn test_order_detail_includes_history_and_timeline() {
        let pool = test_support::pool().await;
        let b = test_support::booked_order(&pool).await;
        workflow::assign_lab(&pool, b.order_id, b.lab_id, b.user_id).await.unwrap();

        let detail = order_detail(&pool, b.order_id).await.unwrap().unwrap();
        assert_eq!(detail.customer_name, "Pat");
        assert_eq!(detail.lab.unwrap().id, b.lab_id);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].name, "Test CBC001");

        let statuses: Vec<OrderStatus> = detail.history.iter().map(|h| h.status).collect();
        assert_eq!(statuses, vec![OrderStatus::Pending, OrderStatus::Assigned]);
        assert_eq!(detail.timeline.current, OrderStatus::Assigned);
        assert_eq!(detail.timeline.steps[0].notes.as_deref(), Some("Order placed"));

        assert!(order_detail(&pool, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lab_orders_only_lists_assigned() {
        let pool = test_support::pool().await;
        let b = test_support::booked_order(&pool).await;
        assert!(lab_orders(&pool, b.lab_id, None).await.unwrap().is_empty());

        workflow::assign_lab(&pool, b.order_id, b.lab_id, b.user_id).await.unwrap();
        let list = lab_orders(&pool, b.lab_id, None).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].items.len(), 1);
        assert_eq!(list[0].items[0].id, b.item_id);

        let pending = lab_orders(&pool, b.lab_id, Some(OrderStatus::Assigned)).await.unwrap();
        assert_eq!(pending.len(), 1);
        let done = lab_orders(&pool, b.lab_id, Some(OrderStatus::Completed)).await.unwrap();
        assert!(done.is_empty());
    }
}
