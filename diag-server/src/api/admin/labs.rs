//! Lab administration

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Invitation, Lab, LabCreate, LabUpdate};

use crate::api::ApiResult;
use crate::auth::AdminUser;
use crate::db::labs;
use crate::services::organization;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_email, validate_optional_email,
    validate_optional_text, validate_optional_url, validate_rating, validate_required_text,
    validate_slug, validate_text_list,
};

fn validate_lab_create(data: &LabCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_slug(&data.slug, "slug")?;
    validate_optional_url(&data.logo, "logo")?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_text_list(&data.accreditations, "accreditations")?;
    validate_text_list(&data.service_areas, "service_areas")?;
    validate_optional_text(&data.contact_phone, "contact_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_email(&data.contact_email, "contact_email")?;
    validate_optional_email(&data.owner_email, "owner_email")?;
    Ok(())
}

/// Checks shared by the admin update and the lab's own settings page
pub(crate) fn validate_lab_update(data: &LabUpdate) -> Result<(), AppError> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_url(&data.logo, "logo")?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    if let Some(rating) = data.rating {
        validate_rating(rating)?;
    }
    if let Some(list) = &data.accreditations {
        validate_text_list(list, "accreditations")?;
    }
    if let Some(list) = &data.service_areas {
        validate_text_list(list, "service_areas")?;
    }
    validate_optional_text(&data.contact_phone, "contact_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_email(&data.contact_email, "contact_email")?;
    Ok(())
}

#[derive(Serialize)]
pub struct LabCreated {
    pub lab: Lab,
    /// Owner invitation, when an owner email was given
    pub invitation: Option<Invitation>,
}

/// GET /api/admin/labs - newest first
pub async fn list(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Vec<Lab>> {
    Ok(Json(labs::list(&state.pool).await?))
}

/// GET /api/admin/labs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Lab> {
    let lab = labs::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LabNotFound))?;
    Ok(Json(lab))
}

/// POST /api/admin/labs
pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(mut payload): Json<LabCreate>,
) -> ApiResult<LabCreated> {
    validate_lab_create(&payload)?;
    payload.owner_email = payload
        .owner_email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty());

    let (lab_id, invitation) =
        organization::create_lab(&state.pool, &payload, admin.id, state.invitation_ttl_ms).await?;
    let lab = labs::find_by_id(&state.pool, lab_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LabNotFound))?;

    Ok(Json(LabCreated { lab, invitation }))
}

/// PUT /api/admin/labs/{id}
pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<LabUpdate>,
) -> ApiResult<Lab> {
    validate_lab_update(&payload)?;

    let now = shared::util::now_millis();
    if !labs::update(&state.pool, id, &payload, now).await? {
        return Err(AppError::new(ErrorCode::LabNotFound).into());
    }
    tracing::info!(lab_id = id, admin_id = admin.id, "Lab updated");

    let lab = labs::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LabNotFound))?;
    Ok(Json(lab))
}

/// DELETE /api/admin/labs/{id}
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    if !labs::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::LabNotFound).into());
    }
    tracing::info!(lab_id = id, admin_id = admin.id, "Lab deleted");
    Ok(Json(true))
}
