//! Catalog: test categories, tests and packages

use shared::models::{
    Package, PackageCreate, PackageTestRef, PublicTest, TestCategory, TestCategoryCreate,
    TestCreate, TestWithCategory,
};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

// ── Categories ──

pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<TestCategory>, sqlx::Error> {
    sqlx::query_as::<_, TestCategory>(
        "SELECT id, name, slug, description, created_at FROM test_categories ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

pub async fn create_category(
    conn: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    data: &TestCategoryCreate,
    now: i64,
) -> Result<TestCategory, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO test_categories (id, name, slug, description, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.slug)
    .bind(&data.description)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(TestCategory {
        id,
        name: data.name.trim().to_string(),
        slug: data.slug.clone(),
        description: data.description.clone(),
        created_at: now,
    })
}

pub async fn category_exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM test_categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

// ── Tests ──

const TEST_WITH_CATEGORY: &str = "SELECT t.id, t.name, t.code, t.category_id, c.name AS category_name, \
     t.description, t.turnaround_time, t.fasting_required, t.sample_type, t.created_at \
     FROM tests t JOIN test_categories c ON c.id = t.category_id";

/// Newest first
pub async fn list_tests(pool: &SqlitePool) -> Result<Vec<TestWithCategory>, sqlx::Error> {
    sqlx::query_as::<_, TestWithCategory>(&format!(
        "{TEST_WITH_CATEGORY} ORDER BY t.created_at DESC, t.id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_test(pool: &SqlitePool, id: i64) -> Result<Option<TestWithCategory>, sqlx::Error> {
    sqlx::query_as::<_, TestWithCategory>(&format!("{TEST_WITH_CATEGORY} WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_test(
    conn: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    data: &TestCreate,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO tests (id, name, code, category_id, description, turnaround_time, \
         fasting_required, sample_type, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.code.trim())
    .bind(data.category_id)
    .bind(&data.description)
    .bind(&data.turnaround_time)
    .bind(data.fasting_required)
    .bind(&data.sample_type)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Which of `ids` exist
pub async fn existing_test_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT id FROM tests WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, (i64,)>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(conn).await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Lowest price among labs currently offering the test
pub async fn best_price(conn: &mut SqliteConnection, test_id: i64) -> Result<Option<f64>, sqlx::Error> {
    let row: (Option<f64>,) =
        sqlx::query_as("SELECT MIN(price) FROM lab_tests WHERE test_id = ? AND is_available = 1")
            .bind(test_id)
            .fetch_one(conn)
            .await?;
    Ok(row.0)
}

/// Public list: best available price (0 when no lab offers the test) and lab count
pub async fn list_public_tests(pool: &SqlitePool) -> Result<Vec<PublicTest>, sqlx::Error> {
    sqlx::query_as::<_, PublicTest>(
        "SELECT t.id, t.name, t.code, t.category_id, c.name AS category_name, t.description, \
                t.turnaround_time, t.fasting_required, t.sample_type, \
                COALESCE(MIN(lt.price), 0.0) AS best_price, \
                COUNT(lt.id) AS lab_count \
         FROM tests t \
         JOIN test_categories c ON c.id = t.category_id \
         LEFT JOIN lab_tests lt ON lt.test_id = t.id AND lt.is_available = 1 \
         GROUP BY t.id \
         ORDER BY t.name",
    )
    .fetch_all(pool)
    .await
}

// ── Packages ──

pub async fn find_package(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Package>, sqlx::Error> {
    sqlx::query_as::<_, Package>(
        "SELECT id, name, slug, description, price, discount_price, is_popular, recommended_for, \
         created_at FROM packages WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Popular first, then by name; each with its tests
pub async fn list_packages(pool: &SqlitePool) -> Result<Vec<Package>, sqlx::Error> {
    let mut packages = sqlx::query_as::<_, Package>(
        "SELECT id, name, slug, description, price, discount_price, is_popular, recommended_for, \
         created_at FROM packages ORDER BY is_popular DESC, name",
    )
    .fetch_all(pool)
    .await?;

    let links: Vec<(i64, i64, String, String)> = sqlx::query_as(
        "SELECT pt.package_id, t.id, t.name, t.code \
         FROM package_tests pt JOIN tests t ON t.id = pt.test_id ORDER BY t.name",
    )
    .fetch_all(pool)
    .await?;

    let mut by_package: HashMap<i64, Vec<PackageTestRef>> = HashMap::new();
    for (package_id, id, name, code) in links {
        by_package
            .entry(package_id)
            .or_default()
            .push(PackageTestRef { id, name, code });
    }
    for package in &mut packages {
        package.tests = by_package.remove(&package.id).unwrap_or_default();
    }
    Ok(packages)
}

/// Insert the package and its test links (call inside a transaction)
pub async fn create_package(
    conn: &mut SqliteConnection,
    data: &PackageCreate,
    test_ids: &[i64],
    now: i64,
) -> Result<i64, sqlx::Error> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO packages (id, name, slug, description, price, discount_price, is_popular, \
         recommended_for, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.slug)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.discount_price)
    .bind(data.is_popular)
    .bind(&data.recommended_for)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    for test_id in test_ids {
        sqlx::query("INSERT INTO package_tests (package_id, test_id) VALUES (?, ?)")
            .bind(id)
            .bind(test_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_public_tests_use_best_available_price() {
        let pool = test_support::pool().await;
        let category = test_support::category(&pool, "hematology").await;
        let cbc = test_support::test(&pool, category, "CBC001").await;
        let tsh = test_support::test(&pool, category, "TSH001").await;
        let lab_a = test_support::lab(&pool, "lab-a").await;
        let lab_b = test_support::lab(&pool, "lab-b").await;

        test_support::price(&pool, lab_a, cbc, 500.0, true).await;
        test_support::price(&pool, lab_b, cbc, 450.0, true).await;
        // Unavailable offerings don't count
        test_support::price(&pool, lab_b, tsh, 100.0, false).await;

        let tests = list_public_tests(&pool).await.unwrap();
        let cbc_row = tests.iter().find(|t| t.id == cbc).unwrap();
        assert_eq!(cbc_row.best_price, 450.0);
        assert_eq!(cbc_row.lab_count, 2);
        assert_eq!(cbc_row.category_name, "hematology");

        let tsh_row = tests.iter().find(|t| t.id == tsh).unwrap();
        assert_eq!(tsh_row.best_price, 0.0);
        assert_eq!(tsh_row.lab_count, 0);

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(best_price(&mut conn, cbc).await.unwrap(), Some(450.0));
        assert_eq!(best_price(&mut conn, tsh).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_test_code_rejected() {
        let pool = test_support::pool().await;
        let category = test_support::category(&pool, "biochemistry").await;
        test_support::test(&pool, category, "LIP001").await;

        let data = TestCreate {
            name: "Another".into(),
            code: "LIP001".into(),
            category_id: category,
            description: None,
            turnaround_time: None,
            fasting_required: false,
            sample_type: None,
        };
        let err = create_test(&pool, &data, 5).await.unwrap_err();
        assert!(crate::error::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_package_lists_its_tests() {
        let pool = test_support::pool().await;
        let category = test_support::category(&pool, "hematology").await;
        let cbc = test_support::test(&pool, category, "CBC001").await;
        let lip = test_support::test(&pool, category, "LIP001").await;

        let data = PackageCreate {
            name: "Basic Wellness Check".into(),
            slug: "basic-wellness".into(),
            description: None,
            price: 2500.0,
            discount_price: Some(2000.0),
            is_popular: true,
            recommended_for: None,
            test_ids: vec![cbc, lip],
        };
        let mut tx = pool.begin().await.unwrap();
        let existing = existing_test_ids(&mut tx, &[cbc, lip, 999]).await.unwrap();
        assert_eq!(existing.len(), 2);
        let id = create_package(&mut tx, &data, &existing, 10).await.unwrap();
        tx.commit().await.unwrap();

        let packages = list_packages(&pool).await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].id, id);
        assert_eq!(packages[0].tests.len(), 2);
        assert_eq!(packages[0].effective_price(), 2000.0);
    }
}
