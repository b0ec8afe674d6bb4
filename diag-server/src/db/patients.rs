//! Patient-owned records: addresses and family members

use shared::models::{Address, AddressCreate, FamilyMember, FamilyMemberCreate};
use sqlx::{SqliteConnection, SqlitePool};

const ADDRESS_COLUMNS: &str =
    "id, user_id, label, address, city, area, zip_code, is_default, created_at";
const FAMILY_COLUMNS: &str =
    "id, user_id, name, relation, date_of_birth, gender, blood_group, created_at";

/// Label used when the patient doesn't name the address
pub const DEFAULT_ADDRESS_LABEL: &str = "Home";

// ── Addresses ──

/// Default address first, then newest
pub async fn list_addresses(pool: &SqlitePool, user_id: i64) -> Result<Vec<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = ? \
         ORDER BY is_default DESC, created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_address(pool: &SqlitePool, id: i64) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Address owned by `user_id`
pub async fn find_address_for_user(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Insert an address. A new default clears the flag on the user's others.
pub async fn create_address(
    conn: &mut SqliteConnection,
    user_id: i64,
    data: &AddressCreate,
    now: i64,
) -> Result<Address, sqlx::Error> {
    if data.is_default {
        sqlx::query("UPDATE addresses SET is_default = 0 WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    }

    let label = data
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_ADDRESS_LABEL)
        .to_string();

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO addresses (id, user_id, label, address, city, area, zip_code, is_default, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(&label)
    .bind(data.address.trim())
    .bind(&data.city)
    .bind(&data.area)
    .bind(&data.zip_code)
    .bind(data.is_default)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Address {
        id,
        user_id,
        label,
        address: data.address.trim().to_string(),
        city: data.city.clone(),
        area: data.area.clone(),
        zip_code: data.zip_code.clone(),
        is_default: data.is_default,
        created_at: now,
    })
}

// ── Family members ──

/// Oldest first (the account holder usually comes first)
pub async fn list_family(pool: &SqlitePool, user_id: i64) -> Result<Vec<FamilyMember>, sqlx::Error> {
    sqlx::query_as::<_, FamilyMember>(&format!(
        "SELECT {FAMILY_COLUMNS} FROM family_members WHERE user_id = ? ORDER BY created_at, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_family_member_for_user(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
) -> Result<Option<FamilyMember>, sqlx::Error> {
    sqlx::query_as::<_, FamilyMember>(&format!(
        "SELECT {FAMILY_COLUMNS} FROM family_members WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn create_family_member(
    conn: &mut SqliteConnection,
    user_id: i64,
    data: &FamilyMemberCreate,
    now: i64,
) -> Result<FamilyMember, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO family_members (id, user_id, name, relation, date_of_birth, gender, blood_group, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(data.name.trim())
    .bind(data.relation)
    .bind(&data.date_of_birth)
    .bind(data.gender)
    .bind(&data.blood_group)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(FamilyMember {
        id,
        user_id,
        name: data.name.trim().to_string(),
        relation: data.relation,
        date_of_birth: data.date_of_birth.clone(),
        gender: data.gender,
        blood_group: data.blood_group.clone(),
        created_at: now,
    })
}

/// Order items that name this family member as patient
pub async fn count_order_items(pool: &SqlitePool, family_member_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_items WHERE patient_id = ?")
        .bind(family_member_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete_family_member(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM family_members WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}
