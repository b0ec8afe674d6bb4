//! User accounts

use shared::models::{User, UserRole};
use sqlx::SqlitePool;

/// User row including the password hash (never serialized)
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

const USER_COLUMNS: &str = "id, name, email, phone, role, created_at";

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    role: UserRole,
    password_hash: &str,
    now: i64,
) -> Result<User, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO users (id, name, email, phone, role, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(role)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.map(str::to_string),
        role,
        created_at: now,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_credentials(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as::<_, UserCredentials>("SELECT id, password_hash FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Partial profile update; `None` keeps the stored value
pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    phone: Option<&str>,
    now: i64,
) -> Result<Option<User>, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE users SET name = COALESCE(?, name), phone = COALESCE(?, phone), updated_at = ? \
         WHERE id = ?",
    )
    .bind(name)
    .bind(phone)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = crate::db::connect_in_memory().await.unwrap();
        let user = create(&pool, "Pat", "pat@example.com", None, UserRole::User, "hash", 1)
            .await
            .unwrap();

        let found = find_by_email(&pool, "pat@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, UserRole::User);

        let creds = find_credentials(&pool, "pat@example.com").await.unwrap().unwrap();
        assert_eq!(creds.password_hash, "hash");

        let dup = create(&pool, "Pat 2", "pat@example.com", None, UserRole::User, "h", 2).await;
        assert!(crate::error::is_unique_violation(&dup.unwrap_err()));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_missing_fields() {
        let pool = crate::db::connect_in_memory().await.unwrap();
        let user = create(&pool, "Pat", "pat@example.com", Some("017"), UserRole::User, "h", 1)
            .await
            .unwrap();

        let updated = update_profile(&pool, user.id, Some("Patricia"), None, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Patricia");
        assert_eq!(updated.phone.as_deref(), Some("017"));

        assert!(update_profile(&pool, 42, Some("x"), None, 3).await.unwrap().is_none());
    }
}
