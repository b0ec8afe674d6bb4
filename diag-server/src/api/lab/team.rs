//! Lab team, invitations and settings

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Invitation, InvitationCreate, Lab, LabMember, LabUpdate};

use crate::api::ApiResult;
use crate::api::admin::validate_lab_update;
use crate::auth::LabStaff;
use crate::db::{invitations, labs};
use crate::services::organization;
use crate::state::AppState;
use crate::utils::validation::{normalize_email, validate_email};

/// GET /api/lab/team
pub async fn members(State(state): State<AppState>, staff: LabStaff) -> ApiResult<Vec<LabMember>> {
    Ok(Json(labs::list_members(&state.pool, staff.lab_id).await?))
}

/// GET /api/lab/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    staff: LabStaff,
) -> ApiResult<Vec<Invitation>> {
    Ok(Json(invitations::list_for_lab(&state.pool, staff.lab_id).await?))
}

/// POST /api/lab/invitations
pub async fn invite(
    State(state): State<AppState>,
    staff: LabStaff,
    Json(payload): Json<InvitationCreate>,
) -> ApiResult<Invitation> {
    staff.require_manager()?;
    validate_email(payload.email.trim(), "email")?;

    let invitation = organization::invite(
        &state.pool,
        staff.lab_id,
        staff.user.id,
        &normalize_email(&payload.email),
        payload.role,
        state.invitation_ttl_ms,
    )
    .await?;
    Ok(Json(invitation))
}

/// DELETE /api/lab/invitations/{id}
pub async fn cancel_invitation(
    State(state): State<AppState>,
    staff: LabStaff,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    staff.require_manager()?;
    organization::cancel(&state.pool, staff.lab_id, id).await?;
    Ok(Json(true))
}

/// GET /api/lab/settings
pub async fn settings(State(state): State<AppState>, staff: LabStaff) -> ApiResult<Lab> {
    let lab = labs::find_by_id(&state.pool, staff.lab_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LabNotFound))?;
    Ok(Json(lab))
}

/// PUT /api/lab/settings
///
/// Labs edit their own profile and contact details; name, rating,
/// verification and status stay with the platform admins.
pub async fn update_settings(
    State(state): State<AppState>,
    staff: LabStaff,
    Json(payload): Json<LabUpdate>,
) -> ApiResult<Lab> {
    staff.require_manager()?;

    let patch = LabUpdate {
        logo: payload.logo,
        address: payload.address,
        accreditations: payload.accreditations,
        service_areas: payload.service_areas,
        contact_phone: payload.contact_phone,
        contact_email: payload.contact_email,
        ..Default::default()
    };
    validate_lab_update(&patch)?;

    labs::update(&state.pool, staff.lab_id, &patch, shared::util::now_millis()).await?;
    tracing::info!(lab_id = staff.lab_id, user_id = staff.user.id, "Lab settings updated");
    settings(State(state), staff).await
}
