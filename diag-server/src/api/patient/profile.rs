//! Family members, addresses, profile and incoming lab invitations

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Address, AddressCreate, FamilyMember, FamilyMemberCreate, Invitation, ProfileUpdate, User,
};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::db::{invitations, patients, users};
use crate::services::{ordering, organization};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

/// GET /api/family
pub async fn list_family(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<FamilyMember>> {
    Ok(Json(patients::list_family(&state.pool, user.id).await?))
}

/// POST /api/family
pub async fn create_family_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<FamilyMemberCreate>,
) -> ApiResult<FamilyMember> {
    ordering::validate_family_member(&payload, "")?;
    let mut conn = state.pool.acquire().await?;
    let member =
        patients::create_family_member(&mut conn, user.id, &payload, shared::util::now_millis())
            .await?;
    Ok(Json(member))
}

/// DELETE /api/family/{id}
///
/// Members that appear on an order stay, so the order keeps its patient.
pub async fn delete_family_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let member = {
        let mut conn = state.pool.acquire().await?;
        patients::find_family_member_for_user(&mut conn, id, user.id).await?
    };
    if member.is_none() {
        return Err(AppError::new(ErrorCode::FamilyMemberNotFound).into());
    }
    if patients::count_order_items(&state.pool, id).await? > 0 {
        return Err(AppError::new(ErrorCode::FamilyMemberInUse).into());
    }
    if !patients::delete_family_member(&state.pool, id, user.id).await? {
        return Err(AppError::new(ErrorCode::FamilyMemberNotFound).into());
    }
    Ok(Json(true))
}

/// GET /api/addresses - default first
pub async fn list_addresses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<Address>> {
    Ok(Json(patients::list_addresses(&state.pool, user.id).await?))
}

/// POST /api/addresses
pub async fn create_address(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<AddressCreate>,
) -> ApiResult<Address> {
    ordering::validate_address(&payload, "")?;
    let mut tx = state.pool.begin().await?;
    let address =
        patients::create_address(&mut tx, user.id, &payload, shared::util::now_millis()).await?;
    tx.commit().await?;
    Ok(Json(address))
}

/// GET /api/profile
pub async fn get_profile(State(state): State<AppState>, user: CurrentUser) -> ApiResult<User> {
    let profile = users::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SessionExpired))?;
    Ok(Json(profile))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> ApiResult<User> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let profile = users::update_profile(
        &state.pool,
        user.id,
        payload.name.as_deref().map(str::trim),
        payload.phone.as_deref().map(str::trim),
        shared::util::now_millis(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::SessionExpired))?;
    Ok(Json(profile))
}

/// GET /api/invitations - pending invitations addressed to the caller
pub async fn list_invitations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<Invitation>> {
    let now = shared::util::now_millis();
    Ok(Json(
        invitations::list_pending_for_email(&state.pool, &user.email, now).await?,
    ))
}

/// POST /api/invitations/{id}/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Invitation> {
    let invitation = organization::accept(&state.pool, id, user.id, &user.email).await?;
    Ok(Json(invitation))
}
