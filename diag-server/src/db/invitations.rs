//! Lab invitations

use shared::models::{Invitation, InvitationStatus, LabMemberRole};
use sqlx::{SqliteConnection, SqlitePool};

const INVITATION_COLUMNS: &str =
    "id, lab_id, email, role, status, inviter_id, expires_at, created_at";

pub async fn create(
    conn: &mut SqliteConnection,
    lab_id: i64,
    email: &str,
    role: LabMemberRole,
    inviter_id: Option<i64>,
    expires_at: i64,
    now: i64,
) -> Result<Invitation, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO invitations (id, lab_id, email, role, status, inviter_id, expires_at, created_at) \
         VALUES (?, ?, ?, ?, 'pending', ?, ?, ?)",
    )
    .bind(id)
    .bind(lab_id)
    .bind(email)
    .bind(role)
    .bind(inviter_id)
    .bind(expires_at)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(Invitation {
        id,
        lab_id,
        email: email.to_string(),
        role,
        status: InvitationStatus::Pending,
        inviter_id,
        expires_at,
        created_at: now,
    })
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Newest first
pub async fn list_for_lab(pool: &SqlitePool, lab_id: i64) -> Result<Vec<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {INVITATION_COLUMNS} FROM invitations WHERE lab_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(lab_id)
    .fetch_all(pool)
    .await
}

/// Pending, unexpired invitations addressed to `email`
pub async fn list_pending_for_email(
    pool: &SqlitePool,
    email: &str,
    now: i64,
) -> Result<Vec<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {INVITATION_COLUMNS} FROM invitations \
         WHERE email = ? AND status = 'pending' AND expires_at > ? ORDER BY created_at DESC"
    ))
    .bind(email)
    .bind(now)
    .fetch_all(pool)
    .await
}

/// Move a pending invitation to `status`; false when it was not pending
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: InvitationStatus,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE invitations SET status = ? WHERE id = ? AND status = 'pending'")
            .bind(status)
            .bind(id)
            .execute(conn)
            .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_pending_listing_and_status_moves() {
        let pool = test_support::pool().await;
        let lab = test_support::lab(&pool, "lab-a").await;

        let mut conn = pool.acquire().await.unwrap();
        let live = create(&mut conn, lab, "tech@lab.test", LabMemberRole::Member, None, 1_000, 1)
            .await
            .unwrap();
        create(&mut conn, lab, "tech@lab.test", LabMemberRole::Admin, None, 10, 1)
            .await
            .unwrap();
        drop(conn);

        let pending = list_pending_for_email(&pool, "tech@lab.test", 500).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, live.id);
        assert_eq!(list_for_lab(&pool, lab).await.unwrap().len(), 2);

        let mut conn = pool.acquire().await.unwrap();
        assert!(set_status(&mut conn, live.id, InvitationStatus::Canceled).await.unwrap());
        // Only pending invitations move
        assert!(!set_status(&mut conn, live.id, InvitationStatus::Accepted).await.unwrap());
        let stored = find_by_id(&mut conn, live.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Canceled);
    }
}
