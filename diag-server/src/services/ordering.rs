//! Placing an order
//!
//! Prices come from the catalog, never from the client: a test costs the
//! lowest price among labs offering it, a package its discounted price.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AddressCreate, AddressInput, CartLine, CreateOrderRequest, CreateOrderResponse,
    FamilyMemberCreate, OrderItemType, OrderStatus, PatientInput,
};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;

use crate::db::{catalog, orders, patients};
use crate::error::ServiceResult;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_LIST_ITEMS, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, parse_date,
    validate_optional_text, validate_required_text, validate_scheduled_date,
};

pub const PAYMENT_METHOD: &str = "cash";
pub const ORDER_PLACED_NOTE: &str = "Order placed";

/// Cart lines in first-seen order with duplicates dropped
pub fn dedupe_cart(lines: &[CartLine]) -> Vec<CartLine> {
    let mut seen = HashSet::new();
    lines.iter().copied().filter(|l| seen.insert(*l)).collect()
}

/// Shape checks that don't need the database
pub fn validate_request(req: &CreateOrderRequest, today: NaiveDate) -> Result<(), AppError> {
    validate_scheduled_date(&req.scheduled_date, today)?;
    validate_required_text(&req.scheduled_time_slot, "scheduled_time_slot", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;

    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if req.items.len() > MAX_LIST_ITEMS {
        return Err(AppError::invalid_field("items", "Too many items in the cart"));
    }

    if let PatientInput::New(patient) = &req.patient {
        validate_family_member(patient, "patient.")?;
    }
    if let AddressInput::New(address) = &req.address {
        validate_address(address, "address.")?;
    }
    Ok(())
}

/// Field names in errors are `prefix` + the field
pub fn validate_family_member(data: &FamilyMemberCreate, prefix: &str) -> Result<(), AppError> {
    validate_required_text(&data.name, &format!("{prefix}name"), MAX_NAME_LEN)?;
    validate_optional_text(
        &data.blood_group,
        &format!("{prefix}blood_group"),
        MAX_SHORT_TEXT_LEN,
    )?;
    if let Some(dob) = &data.date_of_birth {
        parse_date(dob, &format!("{prefix}date_of_birth"))?;
    }
    Ok(())
}

pub fn validate_address(data: &AddressCreate, prefix: &str) -> Result<(), AppError> {
    validate_required_text(&data.address, &format!("{prefix}address"), MAX_ADDRESS_LEN)?;
    for (value, field) in [
        (&data.label, "label"),
        (&data.city, "city"),
        (&data.area, "area"),
        (&data.zip_code, "zip_code"),
    ] {
        validate_optional_text(value, &format!("{prefix}{field}"), MAX_SHORT_TEXT_LEN)?;
    }
    Ok(())
}

async fn line_price(conn: &mut SqliteConnection, line: CartLine) -> ServiceResult<f64> {
    match line.item_type {
        OrderItemType::Test => {
            if catalog::existing_test_ids(conn, &[line.id]).await?.is_empty() {
                return Err(AppError::new(ErrorCode::TestNotFound)
                    .with_detail("test_id", line.id)
                    .into());
            }
            catalog::best_price(conn, line.id).await?.ok_or_else(|| {
                AppError::new(ErrorCode::TestNotOffered)
                    .with_detail("test_id", line.id)
                    .into()
            })
        }
        OrderItemType::Package => catalog::find_package(conn, line.id)
            .await?
            .map(|p| p.effective_price())
            .ok_or_else(|| {
                AppError::new(ErrorCode::PackageNotFound)
                    .with_detail("package_id", line.id)
                    .into()
            }),
    }
}

/// Validate, price and persist an order with its items and the initial
/// history row, all in one transaction
pub async fn create_order(
    pool: &SqlitePool,
    user_id: i64,
    req: &CreateOrderRequest,
    today: NaiveDate,
) -> ServiceResult<CreateOrderResponse> {
    validate_request(req, today)?;
    let lines = dedupe_cart(&req.items);

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let mut priced = Vec::with_capacity(lines.len());
    for line in lines {
        priced.push((line, line_price(&mut tx, line).await?));
    }
    let total_amount: f64 = priced.iter().map(|(_, price)| price).sum();

    let patient_id = match &req.patient {
        PatientInput::Existing { family_member_id } => {
            patients::find_family_member_for_user(&mut tx, *family_member_id, user_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::FamilyMemberNotFound))?
                .id
        }
        PatientInput::New(data) => {
            patients::create_family_member(&mut tx, user_id, data, now)
                .await?
                .id
        }
    };

    let address_id = match &req.address {
        AddressInput::Existing { address_id } => {
            patients::find_address_for_user(&mut tx, *address_id, user_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound))?
                .id
        }
        AddressInput::New(data) => patients::create_address(&mut tx, user_id, data, now).await?.id,
    };

    let order_id = orders::insert(
        &mut tx,
        &orders::NewOrder {
            user_id,
            total_amount,
            payment_method: PAYMENT_METHOD,
            scheduled_date: req.scheduled_date.trim(),
            scheduled_time_slot: req.scheduled_time_slot.trim(),
            address_id: Some(address_id),
            notes: req.notes.as_deref(),
        },
        now,
    )
    .await?;

    for (line, price) in &priced {
        orders::insert_item(
            &mut tx,
            order_id,
            line.item_type,
            line.id,
            *price,
            Some(patient_id),
            now,
        )
        .await?;
    }

    orders::insert_history(
        &mut tx,
        order_id,
        OrderStatus::Pending,
        Some(user_id),
        Some(ORDER_PLACED_NOTE),
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(order_id, user_id, items = priced.len(), total_amount, "Order placed");
    Ok(CreateOrderResponse {
        order_id,
        total_amount,
        redirect_to: format!("/orders/{order_id}"),
    })
}
