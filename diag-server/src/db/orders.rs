//! Orders, order items, reports and the status history

use shared::models::{
    Order, OrderItem, OrderItemStatus, OrderItemType, OrderStatus, OrderSummary, Report,
    ReportSummary, StatusHistoryEntry,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount, payment_status, payment_method, \
     scheduled_date, scheduled_time_slot, address_id, assigned_lab_id, notes, created_at, updated_at";

const SUMMARY_SELECT: &str = "SELECT o.id, o.user_id, u.name AS customer_name, o.status, \
     o.total_amount, o.payment_status, o.scheduled_date, o.scheduled_time_slot, \
     o.address_id, o.assigned_lab_id, l.name AS lab_name, \
     (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) AS item_count, o.created_at \
     FROM orders o \
     JOIN users u ON u.id = o.user_id \
     LEFT JOIN labs l ON l.id = o.assigned_lab_id";

const ITEM_SELECT: &str = "SELECT oi.id, oi.order_id, oi.item_type, oi.test_id, oi.package_id, \
     COALESCE(t.name, p.name, '') AS name, oi.price, oi.patient_id, fm.name AS patient_name, oi.status \
     FROM order_items oi \
     LEFT JOIN tests t ON t.id = oi.test_id \
     LEFT JOIN packages p ON p.id = oi.package_id \
     LEFT JOIN family_members fm ON fm.id = oi.patient_id";

/// Order row to insert
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: i64,
    pub total_amount: f64,
    pub payment_method: &'a str,
    pub scheduled_date: &'a str,
    pub scheduled_time_slot: &'a str,
    pub address_id: Option<i64>,
    pub notes: Option<&'a str>,
}

// ── Writes (transaction-scoped) ──

/// Insert a `pending` order with payment `pending`
pub async fn insert(
    conn: &mut SqliteConnection,
    order: &NewOrder<'_>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO orders (id, user_id, status, total_amount, payment_status, payment_method, \
         scheduled_date, scheduled_time_slot, address_id, assigned_lab_id, notes, created_at, updated_at) \
         VALUES (?, ?, 'pending', ?, 'pending', ?, ?, ?, ?, NULL, ?, ?, ?)",
    )
    .bind(id)
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.payment_method)
    .bind(order.scheduled_date)
    .bind(order.scheduled_time_slot)
    .bind(order.address_id)
    .bind(order.notes)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

pub async fn insert_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    item_type: OrderItemType,
    item_id: i64,
    price: f64,
    patient_id: Option<i64>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (test_id, package_id) = match item_type {
        OrderItemType::Test => (Some(item_id), None),
        OrderItemType::Package => (None, Some(item_id)),
    };
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO order_items (id, order_id, item_type, test_id, package_id, price, patient_id, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?)",
    )
    .bind(id)
    .bind(order_id)
    .bind(item_type)
    .bind(test_id)
    .bind(package_id)
    .bind(price)
    .bind(patient_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Append one history row; the returned id grows with every append
pub async fn insert_history(
    conn: &mut SqliteConnection,
    order_id: i64,
    status: OrderStatus,
    changed_by: Option<i64>,
    notes: Option<&str>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO order_status_history (order_id, status, changed_by, notes, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(status)
    .bind(changed_by)
    .bind(notes)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Set the status. `false` when the order doesn't exist.
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: OrderStatus,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

/// Set the assignee and flip the status to `assigned`
pub async fn set_assignee(
    conn: &mut SqliteConnection,
    id: i64,
    lab_id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE orders SET assigned_lab_id = ?, status = 'assigned', updated_at = ? WHERE id = ?",
    )
    .bind(lab_id)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

pub async fn set_item_status(
    conn: &mut SqliteConnection,
    item_id: i64,
    status: OrderItemStatus,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("UPDATE order_items SET status = ? WHERE id = ?")
        .bind(status)
        .bind(item_id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn insert_report(
    conn: &mut SqliteConnection,
    order_item_id: i64,
    file_url: &str,
    notes: Option<&str>,
    lab_id: i64,
    now: i64,
) -> Result<Report, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO reports (id, order_item_id, file_url, notes, uploaded_by_lab_id, uploaded_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(order_item_id)
    .bind(file_url)
    .bind(notes)
    .bind(lab_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(Report {
        id,
        order_item_id,
        file_url: file_url.to_string(),
        notes: notes.map(str::to_string),
        uploaded_by_lab_id: Some(lab_id),
        uploaded_at: now,
    })
}

// ── Reads ──

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Order id of the item, if the item's order is assigned to `lab_id`
pub async fn item_order_for_lab(
    conn: &mut SqliteConnection,
    item_id: i64,
    lab_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT oi.order_id FROM order_items oi JOIN orders o ON o.id = oi.order_id \
         WHERE oi.id = ? AND o.assigned_lab_id = ?",
    )
    .bind(item_id)
    .bind(lab_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(order_id,)| order_id))
}

pub async fn find_summary(pool: &SqlitePool, id: i64) -> Result<Option<OrderSummary>, sqlx::Error> {
    sqlx::query_as::<_, OrderSummary>(&format!("{SUMMARY_SELECT} WHERE o.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// A patient's orders, newest first
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<OrderSummary>, sqlx::Error> {
    sqlx::query_as::<_, OrderSummary>(&format!(
        "{SUMMARY_SELECT} WHERE o.user_id = ? ORDER BY o.created_at DESC, o.id DESC LIMIT ?"
    ))
    .bind(user_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await
}

/// Admin order list: optional status filter, newest first, one page.
/// Returns the page and the total matching count.
pub async fn list_all(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<OrderSummary>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders o");
    let mut page = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
    if let Some(status) = status {
        count.push(" WHERE o.status = ").push_bind(status);
        page.push(" WHERE o.status = ").push_bind(status);
    }
    page.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let (total,) = count.build_query_as::<(i64,)>().fetch_one(pool).await?;
    let orders = page.build_query_as::<OrderSummary>().fetch_all(pool).await?;
    Ok((orders, total))
}

/// Orders assigned to a lab, newest first; optionally only one status
pub async fn list_for_lab(
    pool: &SqlitePool,
    lab_id: i64,
    status: Option<OrderStatus>,
) -> Result<Vec<OrderSummary>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
    query.push(" WHERE o.assigned_lab_id = ").push_bind(lab_id);
    if let Some(status) = status {
        query.push(" AND o.status = ").push_bind(status);
    }
    query.push(" ORDER BY o.created_at DESC, o.id DESC");
    query.build_query_as::<OrderSummary>().fetch_all(pool).await
}

/// Items of one order with their reports
pub async fn items_for_order(pool: &SqlitePool, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    let mut by_order = items_for_orders(pool, &[order_id]).await?;
    Ok(by_order.remove(&order_id).unwrap_or_default())
}

/// Items of several orders keyed by order id, each with its reports
pub async fn items_for_orders(
    pool: &SqlitePool,
    order_ids: &[i64],
) -> Result<HashMap<i64, Vec<OrderItem>>, sqlx::Error> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(ITEM_SELECT);
    query.push(" WHERE oi.order_id IN (");
    let mut ids = query.separated(", ");
    for id in order_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY oi.created_at, oi.id");
    let mut items = query.build_query_as::<OrderItem>().fetch_all(pool).await?;

    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let mut reports = reports_for_items(pool, &item_ids).await?;
    for item in &mut items {
        item.reports = reports.remove(&item.id).unwrap_or_default();
    }

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    Ok(by_order)
}

async fn reports_for_items(
    pool: &SqlitePool,
    item_ids: &[i64],
) -> Result<HashMap<i64, Vec<Report>>, sqlx::Error> {
    if item_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, order_item_id, file_url, notes, uploaded_by_lab_id, uploaded_at \
         FROM reports WHERE order_item_id IN (",
    );
    let mut ids = query.separated(", ");
    for id in item_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY uploaded_at, id");

    let mut by_item: HashMap<i64, Vec<Report>> = HashMap::new();
    for report in query.build_query_as::<Report>().fetch_all(pool).await? {
        by_item.entry(report.order_item_id).or_default().push(report);
    }
    Ok(by_item)
}

/// History of one order in append order
pub async fn history(pool: &SqlitePool, order_id: i64) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
    sqlx::query_as::<_, StatusHistoryEntry>(
        "SELECT id, order_id, status, changed_by, notes, created_at \
         FROM order_status_history WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

/// Every report on a patient's orders, newest first
pub async fn reports_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<ReportSummary>, sqlx::Error> {
    sqlx::query_as::<_, ReportSummary>(
        "SELECT r.id, o.id AS order_id, oi.id AS order_item_id, \
                COALESCE(t.name, p.name, '') AS item_name, fm.name AS patient_name, \
                l.name AS lab_name, r.file_url, r.notes, r.uploaded_at \
         FROM reports r \
         JOIN order_items oi ON oi.id = r.order_item_id \
         JOIN orders o ON o.id = oi.order_id \
         LEFT JOIN tests t ON t.id = oi.test_id \
         LEFT JOIN packages p ON p.id = oi.package_id \
         LEFT JOIN family_members fm ON fm.id = oi.patient_id \
         LEFT JOIN labs l ON l.id = r.uploaded_by_lab_id \
         WHERE o.user_id = ? \
         ORDER BY r.uploaded_at DESC, r.id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_items_carry_names_and_reports() {
        let pool = test_support::pool().await;
        let fx = test_support::booked_order(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(set_assignee(&mut conn, fx.order_id, fx.lab_id, 5).await.unwrap());
        insert_report(&mut conn, fx.item_id, "https://files.test/r.pdf", Some("normal"), fx.lab_id, 6)
            .await
            .unwrap();
        set_item_status(&mut conn, fx.item_id, OrderItemStatus::Reported).await.unwrap();
        drop(conn);

        let items = items_for_order(&pool, fx.order_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Test CBC001");
        assert_eq!(items[0].patient_name.as_deref(), Some("Pat"));
        assert_eq!(items[0].status, OrderItemStatus::Reported);
        assert_eq!(items[0].reports.len(), 1);

        let reports = reports_for_user(&pool, fx.user_id).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].item_name, "Test CBC001");
        assert_eq!(reports[0].lab_name.as_deref(), Some("lab-a"));
    }

    #[tokio::test]
    async fn test_item_lookup_requires_assignment() {
        let pool = test_support::pool().await;
        let fx = test_support::booked_order(&pool).await;
        let other_lab = test_support::lab(&pool, "lab-b").await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(item_order_for_lab(&mut conn, fx.item_id, fx.lab_id).await.unwrap().is_none());
        set_assignee(&mut conn, fx.order_id, fx.lab_id, 2).await.unwrap();
        assert_eq!(
            item_order_for_lab(&mut conn, fx.item_id, fx.lab_id).await.unwrap(),
            Some(fx.order_id)
        );
        assert!(item_order_for_lab(&mut conn, fx.item_id, other_lab).await.unwrap().is_none());

        let order = find(&mut conn, fx.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Assigned);
        assert_eq!(order.assigned_lab_id, Some(fx.lab_id));
    }

    #[tokio::test]
    async fn test_list_all_filters_and_pages() {
        let pool = test_support::pool().await;
        let fx = test_support::booked_order(&pool).await;
        let second = test_support::order_for(&pool, fx.user_id, fx.test_id, fx.patient_id).await;

        let mut conn = pool.acquire().await.unwrap();
        set_status(&mut conn, second, OrderStatus::Confirmed, 10).await.unwrap();
        drop(conn);

        let (all, total) = list_all(&pool, None, 10, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].item_count, 1);

        let (confirmed, total) = list_all(&pool, Some(OrderStatus::Confirmed), 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(confirmed[0].id, second);

        let (page, total) = list_all(&pool, None, 1, 1).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);

        let mine = list_for_user(&pool, fx.user_id, Some(1)).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_ascending() {
        let pool = test_support::pool().await;
        let fx = test_support::booked_order(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        insert_history(&mut conn, fx.order_id, OrderStatus::Confirmed, None, None, 50)
            .await
            .unwrap();
        drop(conn);

        let rows = history(&pool, fx.order_id).await.unwrap();
        let statuses: Vec<OrderStatus> = rows.iter().map(|h| h.status).collect();
        assert_eq!(statuses, vec![OrderStatus::Pending, OrderStatus::Confirmed]);
        assert_eq!(rows[0].notes.as_deref(), Some("Order placed"));
    }

    #[tokio::test]
    async fn test_history_same_millisecond_keeps_insert_order() {
        let pool = test_support::pool().await;
        let fx = test_support::booked_order(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let later = [OrderStatus::Completed, OrderStatus::Confirmed, OrderStatus::Assigned];
        let mut ids = Vec::new();
        for status in later {
            ids.push(insert_history(&mut conn, fx.order_id, status, None, None, 77).await.unwrap());
        }
        drop(conn);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let statuses: Vec<OrderStatus> = history(&pool, fx.order_id)
            .await
            .unwrap()
            .iter()
            .map(|h| h.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Completed,
                OrderStatus::Confirmed,
                OrderStatus::Assigned
            ]
        );
    }
}
