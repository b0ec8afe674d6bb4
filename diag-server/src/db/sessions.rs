//! Sign-in sessions
//!
//! Only the SHA-256 of the session token is stored; the token itself travels
//! inside the signed JWT.

use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub user_id: i64,
    pub expires_at: i64,
}

pub async fn create(
    pool: &SqlitePool,
    token_hash: &str,
    user_id: i64,
    expires_at: i64,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO sessions (id, token_hash, user_id, expires_at, ip_address, user_agent, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(token_hash)
    .bind(user_id)
    .bind(expires_at)
    .bind(ip_address)
    .bind(user_agent)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Live session for a token hash (expired rows are ignored)
pub async fn find_active(
    pool: &SqlitePool,
    token_hash: &str,
    now: i64,
) -> Result<Option<SessionRow>, sqlx::Error> {
    sqlx::query_as::<_, SessionRow>(
        "SELECT id, user_id, expires_at FROM sessions WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn purge_expired(pool: &SqlitePool, now: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::UserRole;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let pool = crate::db::connect_in_memory().await.unwrap();
        let user = crate::db::users::create(&pool, "Pat", "p@x.io", None, UserRole::User, "h", 0)
            .await
            .unwrap();

        let live = create(&pool, "live", user.id, 1_000, None, Some("curl"), 0).await.unwrap();
        create(&pool, "stale", user.id, 10, None, None, 0).await.unwrap();

        assert_eq!(find_active(&pool, "live", 500).await.unwrap().unwrap().id, live);
        assert!(find_active(&pool, "stale", 500).await.unwrap().is_none());

        assert_eq!(purge_expired(&pool, 500).await.unwrap(), 1);
        delete(&pool, live).await.unwrap();
        assert!(find_active(&pool, "live", 500).await.unwrap().is_none());
    }
}
