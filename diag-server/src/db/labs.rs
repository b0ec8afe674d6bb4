//! Labs and their members

use shared::models::{Lab, LabCreate, LabMember, LabMemberRole, LabStatus, LabUpdate};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const LAB_COLUMNS: &str = "id, name, slug, logo, address, rating, is_verified, status, \
     accreditations, service_areas, contact_phone, contact_email, created_at, updated_at";

/// Newest first
pub async fn list(pool: &SqlitePool) -> Result<Vec<Lab>, sqlx::Error> {
    sqlx::query_as::<_, Lab>(&format!(
        "SELECT {LAB_COLUMNS} FROM labs ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Lab>, sqlx::Error> {
    sqlx::query_as::<_, Lab>(&format!("SELECT {LAB_COLUMNS} FROM labs WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lab name, if the lab exists
pub async fn find_name(conn: &mut SqliteConnection, id: i64) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT name FROM labs WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(|(name,)| name))
}

pub async fn create(
    conn: &mut SqliteConnection,
    data: &LabCreate,
    rating: f64,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO labs (id, name, slug, logo, address, rating, is_verified, status, \
         accreditations, service_areas, contact_phone, contact_email, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.slug)
    .bind(&data.logo)
    .bind(&data.address)
    .bind(rating)
    .bind(data.is_verified.unwrap_or(false))
    .bind(data.status.unwrap_or(LabStatus::Pending))
    .bind(Json(&data.accreditations))
    .bind(Json(&data.service_areas))
    .bind(&data.contact_phone)
    .bind(&data.contact_email)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Partial update; returns false when the lab does not exist
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &LabUpdate,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE labs SET \
            name = COALESCE(?, name), \
            logo = COALESCE(?, logo), \
            address = COALESCE(?, address), \
            rating = COALESCE(?, rating), \
            is_verified = COALESCE(?, is_verified), \
            status = COALESCE(?, status), \
            accreditations = COALESCE(?, accreditations), \
            service_areas = COALESCE(?, service_areas), \
            contact_phone = COALESCE(?, contact_phone), \
            contact_email = COALESCE(?, contact_email), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.logo)
    .bind(&data.address)
    .bind(data.rating)
    .bind(data.is_verified)
    .bind(data.status)
    .bind(data.accreditations.as_ref().map(Json))
    .bind(data.service_areas.as_ref().map(Json))
    .bind(&data.contact_phone)
    .bind(&data.contact_email)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Members, invitations and the price list cascade; orders keep their
/// history with the assignee cleared.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM labs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Members ──

/// The lab a user belongs to, with their role
pub async fn membership_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<(i64, LabMemberRole)>, sqlx::Error> {
    sqlx::query_as("SELECT lab_id, role FROM lab_members WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn add_member(
    conn: &mut SqliteConnection,
    lab_id: i64,
    user_id: i64,
    role: LabMemberRole,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO lab_members (lab_id, user_id, role, created_at) VALUES (?, ?, ?, ?)")
        .bind(lab_id)
        .bind(user_id)
        .bind(role)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn list_members(pool: &SqlitePool, lab_id: i64) -> Result<Vec<LabMember>, sqlx::Error> {
    sqlx::query_as::<_, LabMember>(
        "SELECT m.lab_id, m.user_id, u.name, u.email, m.role, m.created_at \
         FROM lab_members m JOIN users u ON u.id = m.user_id \
         WHERE m.lab_id = ? ORDER BY m.created_at, u.name",
    )
    .bind(lab_id)
    .fetch_all(pool)
    .await
}
