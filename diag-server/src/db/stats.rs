//! Dashboard counters

use chrono::{Datelike, TimeZone, Utc};
use shared::models::{AdminStats, LabStats, OrderStatus, PatientDashboard, StatusCount};
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Orders shown on the patient dashboard
pub const RECENT_ORDERS: i64 = 5;

/// Start of the UTC calendar month containing `now_ms`, in milliseconds
pub fn month_start_millis(now_ms: i64) -> i64 {
    let Some(now) = Utc.timestamp_millis_opt(now_ms).single() else {
        return 0;
    };
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .map(|start| start.timestamp_millis())
        .unwrap_or(0)
}

async fn count(pool: &SqlitePool, sql: &str, id: Option<i64>) -> Result<i64, sqlx::Error> {
    let mut query = sqlx::query_as::<_, (i64,)>(sql);
    if let Some(id) = id {
        query = query.bind(id);
    }
    let (n,) = query.fetch_one(pool).await?;
    Ok(n)
}

/// Lab dashboard: pending means `assigned` or `confirmed`
pub async fn lab_stats(pool: &SqlitePool, lab_id: i64, now: i64) -> Result<LabStats, sqlx::Error> {
    let (total_orders, pending_orders, completed_orders): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
                COALESCE(SUM(CASE WHEN status IN ('assigned', 'confirmed') THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) \
         FROM orders WHERE assigned_lab_id = ?",
    )
    .bind(lab_id)
    .fetch_one(pool)
    .await?;

    let (reports_this_month,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM reports WHERE uploaded_by_lab_id = ? AND uploaded_at >= ?",
    )
    .bind(lab_id)
    .bind(month_start_millis(now))
    .fetch_one(pool)
    .await?;

    Ok(LabStats {
        total_orders,
        pending_orders,
        completed_orders,
        reports_this_month,
    })
}

pub async fn admin_stats(pool: &SqlitePool) -> Result<AdminStats, sqlx::Error> {
    let rows: Vec<(OrderStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(pool)
            .await?;
    let counts: HashMap<OrderStatus, i64> = rows.into_iter().collect();

    let orders_by_status: Vec<StatusCount> = OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: counts.get(status).copied().unwrap_or(0),
        })
        .collect();
    let total_orders = orders_by_status.iter().map(|s| s.count).sum();

    let (revenue,): (f64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total_amount), 0.0) FROM orders WHERE status = 'completed'",
    )
    .fetch_one(pool)
    .await?;

    Ok(AdminStats {
        total_orders,
        orders_by_status,
        revenue,
        labs: count(pool, "SELECT COUNT(*) FROM labs", None).await?,
        tests: count(pool, "SELECT COUNT(*) FROM tests", None).await?,
        packages: count(pool, "SELECT COUNT(*) FROM packages", None).await?,
    })
}

/// Active means neither completed nor cancelled
pub async fn patient_dashboard(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<PatientDashboard, sqlx::Error> {
    let total_orders = count(pool, "SELECT COUNT(*) FROM orders WHERE user_id = ?", Some(user_id)).await?;
    let active_orders = count(
        pool,
        "SELECT COUNT(*) FROM orders WHERE user_id = ? AND status NOT IN ('completed', 'cancelled')",
        Some(user_id),
    )
    .await?;
    let reports = count(
        pool,
        "SELECT COUNT(*) FROM reports r JOIN order_items oi ON oi.id = r.order_item_id \
         JOIN orders o ON o.id = oi.order_id WHERE o.user_id = ?",
        Some(user_id),
    )
    .await?;
    let family_members = count(
        pool,
        "SELECT COUNT(*) FROM family_members WHERE user_id = ?",
        Some(user_id),
    )
    .await?;
    let recent_orders = super::orders::list_for_user(pool, user_id, Some(RECENT_ORDERS)).await?;

    Ok(PatientDashboard {
        total_orders,
        active_orders,
        reports,
        family_members,
        recent_orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{orders, test_support};

    #[test]
    fn test_month_start() {
        // 2026-03-15T10:30:00Z
        let mid_march = Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap().timestamp_millis();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap().timestamp_millis();
        assert_eq!(month_start_millis(mid_march), start);
        assert_eq!(month_start_millis(start), start);
    }

    #[tokio::test]
    async fn test_lab_stats_counts() {
        let pool = test_support::pool().await;
        let fx = test_support::booked_order(&pool).await;
        let done = test_support::order_for(&pool, fx.user_id, fx.test_id, fx.patient_id).await;

        let now = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap().timestamp_millis();
        let last_month = Utc.with_ymd_and_hms(2026, 2, 20, 0, 0, 0).unwrap().timestamp_millis();

        let mut conn = pool.acquire().await.unwrap();
        orders::set_assignee(&mut conn, fx.order_id, fx.lab_id, now).await.unwrap();
        orders::set_assignee(&mut conn, done, fx.lab_id, now).await.unwrap();
        orders::set_status(&mut conn, done, OrderStatus::Completed, now).await.unwrap();
        orders::insert_report(&mut conn, fx.item_id, "https://f.test/1.pdf", None, fx.lab_id, now)
            .await
            .unwrap();
        orders::insert_report(&mut conn, fx.item_id, "https://f.test/0.pdf", None, fx.lab_id, last_month)
            .await
            .unwrap();
        drop(conn);

        let stats = lab_stats(&pool, fx.lab_id, now).await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.reports_this_month, 1);
    }

    #[tokio::test]
    async fn test_admin_stats_revenue_from_completed() {
        let pool = test_support::pool().await;
        let fx = test_support::booked_order(&pool).await;
        let done = test_support::order_for(&pool, fx.user_id, fx.test_id, fx.patient_id).await;

        let mut conn = pool.acquire().await.unwrap();
        orders::set_status(&mut conn, done, OrderStatus::Completed, 5).await.unwrap();
        drop(conn);

        let stats = admin_stats(&pool).await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.orders_by_status.len(), 7);
        assert_eq!(stats.orders_by_status[0].count, 1);
        assert_eq!(stats.revenue, test_support::CBC_PRICE);
        assert_eq!(stats.labs, 1);
        assert_eq!(stats.tests, 1);

        let dashboard = patient_dashboard(&pool, fx.user_id).await.unwrap();
        assert_eq!(dashboard.total_orders, 2);
        assert_eq!(dashboard.active_orders, 1);
        assert_eq!(dashboard.family_members, 1);
        assert_eq!(dashboard.recent_orders.len(), 2);
    }
}
