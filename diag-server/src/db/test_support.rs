//! Fixtures for query-module tests

use super::{catalog, lab_tests, labs, orders, patients, users};
use shared::models::{
    FamilyMemberCreate, LabCreate, OrderItemType, OrderStatus, Relation, TestCategoryCreate,
    TestCreate, User, UserRole,
};
use sqlx::SqlitePool;

pub const CBC_PRICE: f64 = 500.0;

pub async fn pool() -> SqlitePool {
    super::connect_in_memory().await.unwrap()
}

pub async fn user(pool: &SqlitePool, email: &str) -> User {
    users::create(pool, "Pat", email, None, UserRole::User, "hash", 1)
        .await
        .unwrap()
}

/// Lab named after its slug
pub async fn lab(pool: &SqlitePool, slug: &str) -> i64 {
    let data = LabCreate {
        name: slug.to_string(),
        slug: slug.to_string(),
        logo: None,
        address: None,
        is_verified: Some(true),
        status: None,
        accreditations: vec![],
        service_areas: vec![],
        contact_phone: None,
        contact_email: None,
        owner_email: None,
    };
    let mut conn = pool.acquire().await.unwrap();
    labs::create(&mut conn, &data, 4.0, 1).await.unwrap()
}

pub async fn category(pool: &SqlitePool, slug: &str) -> i64 {
    let data = TestCategoryCreate {
        name: slug.to_string(),
        slug: slug.to_string(),
        description: None,
    };
    catalog::create_category(pool, &data, 1).await.unwrap().id
}

/// Test named `Test <code>`
pub async fn test(pool: &SqlitePool, category_id: i64, code: &str) -> i64 {
    let data = TestCreate {
        name: format!("Test {code}"),
        code: code.to_string(),
        category_id,
        description: None,
        turnaround_time: Some("24 hours".into()),
        fasting_required: false,
        sample_type: Some("Blood".into()),
    };
    catalog::create_test(pool, &data, 1).await.unwrap()
}

pub async fn price(pool: &SqlitePool, lab_id: i64, test_id: i64, price: f64, available: bool) {
    lab_tests::upsert(pool, lab_id, test_id, price, available, 1)
        .await
        .unwrap();
}

/// A pending order with one test item and its `Order placed` history row
pub async fn order_for(pool: &SqlitePool, user_id: i64, test_id: i64, patient_id: i64) -> i64 {
    let mut tx = pool.begin().await.unwrap();
    let order_id = orders::insert(
        &mut tx,
        &orders::NewOrder {
            user_id,
            total_amount: CBC_PRICE,
            payment_method: "cash",
            scheduled_date: "2026-03-20",
            scheduled_time_slot: "08:00-10:00",
            address_id: None,
            notes: None,
        },
        1,
    )
    .await
    .unwrap();
    orders::insert_item(&mut tx, order_id, OrderItemType::Test, test_id, CBC_PRICE, Some(patient_id), 1)
        .await
        .unwrap();
    orders::insert_history(&mut tx, order_id, OrderStatus::Pending, Some(user_id), Some("Order placed"), 1)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    order_id
}

pub struct BookedOrder {
    pub user_id: i64,
    pub lab_id: i64,
    pub test_id: i64,
    pub patient_id: i64,
    pub order_id: i64,
    pub item_id: i64,
}

/// Patient, lab offering CBC001, and one unassigned order for it
pub async fn booked_order(pool: &SqlitePool) -> BookedOrder {
    let patient = user(pool, "pat@example.com").await;
    let lab_id = lab(pool, "lab-a").await;
    let category_id = category(pool, "hematology").await;
    let test_id = test(pool, category_id, "CBC001").await;
    price(pool, lab_id, test_id, CBC_PRICE, true).await;

    let mut conn = pool.acquire().await.unwrap();
    let member = patients::create_family_member(
        &mut conn,
        patient.id,
        &FamilyMemberCreate {
            name: "Pat".into(),
            relation: Relation::Myself,
            date_of_birth: None,
            gender: None,
            blood_group: None,
        },
        1,
    )
    .await
    .unwrap();
    drop(conn);

    let order_id = order_for(pool, patient.id, test_id, member.id).await;
    let item_id = orders::items_for_order(pool, order_id).await.unwrap()[0].id;

    BookedOrder {
        user_id: patient.id,
        lab_id,
        test_id,
        patient_id: member.id,
        order_id,
        item_id,
    }
}
