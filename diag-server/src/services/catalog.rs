//! Catalog writes that span several tables

use shared::error::{AppError, ErrorCode};
use shared::models::PackageCreate;
use sqlx::SqlitePool;

use crate::db::catalog;
use crate::error::{ServiceResult, conflict_or_db};

/// Create a package with its test links. Every test id must exist;
/// duplicates are linked once.
pub async fn create_package(pool: &SqlitePool, data: &PackageCreate) -> ServiceResult<i64> {
    let mut test_ids = data.test_ids.clone();
    test_ids.sort_unstable();
    test_ids.dedup();

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let existing = catalog::existing_test_ids(&mut tx, &test_ids).await?;
    if let Some(missing) = test_ids.iter().find(|id| !existing.contains(id)) {
        return Err(AppError::new(ErrorCode::TestNotFound)
            .with_detail("test_id", *missing)
            .into());
    }

    let id = catalog::create_package(&mut tx, data, &test_ids, now)
        .await
        .map_err(|e| conflict_or_db(e, ErrorCode::PackageSlugExists))?;
    tx.commit().await?;

    tracing::info!(package_id = id, tests = test_ids.len(), "Package created");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;
    use crate::error::ServiceError;

    fn package(slug: &str, test_ids: Vec<i64>) -> PackageCreate {
        PackageCreate {
            name: "Basic Wellness Check".into(),
            slug: slug.into(),
            description: None,
            price: 2500.0,
            discount_price: Some(2000.0),
            is_popular: true,
            recommended_for: Some("Adults".into()),
            test_ids,
        }
    }

    #[tokio::test]
    async fn test_unknown_test_rolls_back() {
        let pool = test_support::pool().await;
        let category = test_support::category(&pool, "hematology").await;
        let cbc = test_support::test(&pool, category, "CBC001").await;

        match create_package(&pool, &package("wellness", vec![cbc, 777])).await {
            Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::TestNotFound),
            other => panic!("expected TestNotFound, got {other:?}"),
        }
        assert!(catalog::list_packages(&pool).await.unwrap().is_empty());

        create_package(&pool, &package("wellness", vec![cbc, cbc])).await.unwrap();
        let packages = catalog::list_packages(&pool).await.unwrap();
        assert_eq!(packages[0].tests.len(), 1);

        match create_package(&pool, &package("wellness", vec![cbc])).await {
            Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::PackageSlugExists),
            other => panic!("expected PackageSlugExists, got {other:?}"),
        }
    }
}
