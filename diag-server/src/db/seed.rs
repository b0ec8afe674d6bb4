//! Demo catalog for development databases
//!
//! Three categories, three tests, two labs with price lists and one
//! package. Skipped when the catalog already has tests.

use super::{catalog, labs};
use shared::models::{LabCreate, LabStatus, PackageCreate, TestCategoryCreate, TestCreate};
use sqlx::{SqliteConnection, SqlitePool};

/// Seed the demo catalog. Returns `false` if the database wasn't empty.
pub async fn seed_demo_catalog(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    let (tests,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tests")
        .fetch_one(pool)
        .await?;
    if tests > 0 {
        tracing::debug!(tests, "Catalog not empty, skipping demo seed");
        return Ok(false);
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let hematology = category(&mut tx, "Hematology", "Blood related tests", now).await?;
    let biochemistry = category(&mut tx, "Biochemistry", "Chemical processes", now).await?;
    let hormonal = category(&mut tx, "Hormonal", "Hormone levels", now).await?;

    let cbc = test(&mut tx, "Complete Blood Count (CBC)", "CBC001", hematology, false, now).await?;
    let lipid = test(&mut tx, "Lipid Profile", "LIP001", biochemistry, true, now).await?;
    let tsh = test(
        &mut tx,
        "Thyroid Stimulating Hormone (TSH)",
        "TSH001",
        hormonal,
        false,
        now,
    )
    .await?;

    let popular = lab(
        &mut tx,
        "Popular Diagnostic",
        "popular-diagnostic",
        "Dhanmondi, Dhaka",
        4.5,
        now,
    )
    .await?;
    let ibn_sina = lab(&mut tx, "Ibn Sina", "ibn-sina", "Zigatola, Dhaka", 4.8, now).await?;

    for (lab_id, test_id, price) in [
        (popular, cbc, 500.0),
        (popular, lipid, 1200.0),
        (ibn_sina, cbc, 450.0),
        (ibn_sina, tsh, 800.0),
    ] {
        sqlx::query(
            "INSERT INTO lab_tests (id, lab_id, test_id, price, is_available, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(lab_id)
        .bind(test_id)
        .bind(price)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    let wellness = PackageCreate {
        name: "Basic Wellness Check".into(),
        slug: "basic-wellness".into(),
        description: None,
        price: 2500.0,
        discount_price: Some(2000.0),
        is_popular: true,
        recommended_for: Some("Adults".into()),
        test_ids: vec![cbc, lipid],
    };
    catalog::create_package(&mut tx, &wellness, &wellness.test_ids, now).await?;

    tx.commit().await?;
    tracing::info!("Demo catalog seeded");
    Ok(true)
}

async fn category(
    conn: &mut SqliteConnection,
    name: &str,
    description: &str,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let data = TestCategoryCreate {
        name: name.into(),
        slug: shared::util::slugify(name),
        description: Some(description.into()),
    };
    Ok(catalog::create_category(conn, &data, now).await?.id)
}

async fn test(
    conn: &mut SqliteConnection,
    name: &str,
    code: &str,
    category_id: i64,
    fasting_required: bool,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let data = TestCreate {
        name: name.into(),
        code: code.into(),
        category_id,
        description: None,
        turnaround_time: Some("24 Hours".into()),
        fasting_required,
        sample_type: Some("Blood".into()),
    };
    catalog::create_test(conn, &data, now).await
}

async fn lab(
    conn: &mut SqliteConnection,
    name: &str,
    slug: &str,
    address: &str,
    rating: f64,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let data = LabCreate {
        name: name.into(),
        slug: slug.into(),
        logo: None,
        address: Some(address.into()),
        is_verified: Some(true),
        status: Some(LabStatus::Active),
        accreditations: vec![],
        service_areas: vec![],
        contact_phone: None,
        contact_email: None,
        owner_email: None,
    };
    labs::create(conn, &data, rating, now).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_once() {
        let pool = crate::db::connect_in_memory().await.unwrap();
        assert!(seed_demo_catalog(&pool).await.unwrap());
        assert!(!seed_demo_catalog(&pool).await.unwrap());

        let public = catalog::list_public_tests(&pool).await.unwrap();
        assert_eq!(public.len(), 3);
        let cbc = public.iter().find(|t| t.code == "CBC001").unwrap();
        assert_eq!(cbc.best_price, 450.0);
        assert_eq!(cbc.lab_count, 2);
        let lipid = public.iter().find(|t| t.code == "LIP001").unwrap();
        assert!(lipid.fasting_required);

        let packages = catalog::list_packages(&pool).await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].tests.len(), 2);
    }
}
