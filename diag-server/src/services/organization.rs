//! Lab organizations: onboarding, invitations and membership

use shared::error::{AppError, ErrorCode};
use shared::models::{Invitation, InvitationStatus, LabCreate, LabMemberRole};
use sqlx::SqlitePool;

use crate::db::{invitations, labs};
use crate::error::{ServiceResult, conflict_or_db};

/// Path of the page that accepts an invitation
pub fn accept_path(invitation_id: i64) -> String {
    format!("/accept-invitation/{invitation_id}")
}

/// Invitation mail is not sent from here; the link is logged for operators.
fn announce(invitation: &Invitation) {
    tracing::info!(
        invitation_id = invitation.id,
        lab_id = invitation.lab_id,
        email = %invitation.email,
        role = ?invitation.role,
        link = %accept_path(invitation.id),
        "Lab invitation issued"
    );
}

/// Create a lab; with `owner_email` set an owner invitation is issued in
/// the same transaction
pub async fn create_lab(
    pool: &SqlitePool,
    data: &LabCreate,
    inviter_id: i64,
    invitation_ttl_ms: i64,
) -> ServiceResult<(i64, Option<Invitation>)> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let lab_id = labs::create(&mut tx, data, 0.0, now)
        .await
        .map_err(|e| conflict_or_db(e, ErrorCode::LabSlugExists))?;

    let invitation = match data.owner_email.as_deref().filter(|e| !e.is_empty()) {
        Some(email) => Some(
            invitations::create(
                &mut tx,
                lab_id,
                email,
                LabMemberRole::Owner,
                Some(inviter_id),
                now + invitation_ttl_ms,
                now,
            )
            .await?,
        ),
        None => None,
    };
    tx.commit().await?;

    tracing::info!(lab_id, slug = %data.slug, "Lab created");
    if let Some(invitation) = &invitation {
        announce(invitation);
    }
    Ok((lab_id, invitation))
}

/// Invite `email` (already normalized) to the lab
pub async fn invite(
    pool: &SqlitePool,
    lab_id: i64,
    inviter_id: i64,
    email: &str,
    role: LabMemberRole,
    invitation_ttl_ms: i64,
) -> ServiceResult<Invitation> {
    let now = shared::util::now_millis();
    let mut conn = pool.acquire().await?;
    let invitation = invitations::create(
        &mut conn,
        lab_id,
        email,
        role,
        Some(inviter_id),
        now + invitation_ttl_ms,
        now,
    )
    .await?;
    announce(&invitation);
    Ok(invitation)
}

/// Cancel a pending invitation of `lab_id`
pub async fn cancel(pool: &SqlitePool, lab_id: i64, invitation_id: i64) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    let invitation = invitations::find_by_id(&mut tx, invitation_id)
        .await?
        .filter(|i| i.lab_id == lab_id)
        .ok_or_else(|| AppError::new(ErrorCode::InvitationNotFound))?;

    if !invitations::set_status(&mut tx, invitation.id, InvitationStatus::Canceled).await? {
        return Err(AppError::new(ErrorCode::InvitationNotPending).into());
    }
    tx.commit().await?;
    tracing::info!(invitation_id, lab_id, "Invitation canceled");
    Ok(())
}

/// Accept an invitation addressed to `email` and join the lab.
/// An invitation found past its expiry is marked expired.
pub async fn accept(
    pool: &SqlitePool,
    invitation_id: i64,
    user_id: i64,
    email: &str,
) -> ServiceResult<Invitation> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let Some(mut invitation) = invitations::find_by_id(&mut tx, invitation_id).await? else {
        return Err(AppError::new(ErrorCode::InvitationNotFound).into());
    };
    if !invitation.email.eq_ignore_ascii_case(email) {
        crate::security_log!(WARN, "invitation_email_mismatch", invitation_id, user_id);
        return Err(AppError::new(ErrorCode::InvitationEmailMismatch).into());
    }
    if invitation.status != InvitationStatus::Pending {
        return Err(AppError::new(ErrorCode::InvitationNotPending).into());
    }
    if invitation.expires_at <= now {
        invitations::set_status(&mut tx, invitation.id, InvitationStatus::Expired).await?;
        tx.commit().await?;
        return Err(AppError::new(ErrorCode::InvitationExpired).into());
    }

    labs::add_member(&mut tx, invitation.lab_id, user_id, invitation.role, now)
        .await
        .map_err(|e| conflict_or_db(e, ErrorCode::AlreadyLabMember))?;
    invitations::set_status(&mut tx, invitation.id, InvitationStatus::Accepted).await?;
    tx.commit().await?;

    invitation.status = InvitationStatus::Accepted;
    tracing::info!(invitation_id, lab_id = invitation.lab_id, user_id, "Invitation accepted");
    Ok(invitation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;
    use crate::error::ServiceError;

    const HOUR_MS: i64 = 3_600_000;

    fn app_code(err: ServiceError) -> ErrorCode {
        match err {
            ServiceError::App(e) => e.code,
            ServiceError::Db(e) => panic!("unexpected db error: {e}"),
        }
    }

    fn lab_data(slug: &str, owner_email: Option<&str>) -> LabCreate {
        LabCreate {
            name: "Popular Diagnostic".into(),
            slug: slug.into(),
            logo: None,
            address: None,
            is_verified: None,
            status: None,
            accreditations: vec![],
            service_areas: vec![],
            contact_phone: None,
            contact_email: None,
            owner_email: owner_email.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_lab_with_owner_invitation() {
        let pool = test_support::pool().await;
        let admin = test_support::user(&pool, "admin@diag.test").await;
        let owner = test_support::user(&pool, "owner@lab.test").await;

        let (lab_id, invitation) =
            create_lab(&pool, &lab_data("popular", Some("owner@lab.test")), admin.id, HOUR_MS)
                .await
                .unwrap();
        let invitation = invitation.unwrap();
        assert_eq!(invitation.role, LabMemberRole::Owner);

        let err = create_lab(&pool, &lab_data("popular", None), admin.id, HOUR_MS)
            .await
            .unwrap_err();
        assert_eq!(app_code(err), ErrorCode::LabSlugExists);

        let accepted = accept(&pool, invitation.id, owner.id, "Owner@Lab.test").await.unwrap();
        assert_eq!(accepted.status, InvitationStatus::Accepted);
        assert_eq!(
            labs::membership_for_user(&pool, owner.id).await.unwrap(),
            Some((lab_id, LabMemberRole::Owner))
        );

        let err = accept(&pool, invitation.id, owner.id, "owner@lab.test").await.unwrap_err();
        assert_eq!(app_code(err), ErrorCode::InvitationNotPending);
    }

    #[tokio::test]
    async fn test_accept_guards() {
        let pool = test_support::pool().await;
        let lab = test_support::lab(&pool, "lab-a").await;
        let other_lab = test_support::lab(&pool, "lab-b").await;
        let tech = test_support::user(&pool, "tech@lab.test").await;

        let invitation = invite(&pool, lab, tech.id, "tech@lab.test", LabMemberRole::Member, HOUR_MS)
            .await
            .unwrap();
        let err = accept(&pool, invitation.id, tech.id, "someone@else.test").await.unwrap_err();
        assert_eq!(app_code(err), ErrorCode::InvitationEmailMismatch);

        let expired = invite(&pool, lab, tech.id, "tech@lab.test", LabMemberRole::Member, -1)
            .await
            .unwrap();
        let err = accept(&pool, expired.id, tech.id, "tech@lab.test").await.unwrap_err();
        assert_eq!(app_code(err), ErrorCode::InvitationExpired);
        let mut conn = pool.acquire().await.unwrap();
        let stored = invitations::find_by_id(&mut conn, expired.id).await.unwrap().unwrap();
        drop(conn);
        assert_eq!(stored.status, InvitationStatus::Expired);

        accept(&pool, invitation.id, tech.id, "tech@lab.test").await.unwrap();

        // One lab per user
        let second = invite(&pool, other_lab, tech.id, "tech@lab.test", LabMemberRole::Member, HOUR_MS)
            .await
            .unwrap();
        let err = accept(&pool, second.id, tech.id, "tech@lab.test").await.unwrap_err();
        assert_eq!(app_code(err), ErrorCode::AlreadyLabMember);
    }

    #[tokio::test]
    async fn test_cancel_scoped_to_lab() {
        let pool = test_support::pool().await;
        let lab = test_support::lab(&pool, "lab-a").await;
        let other_lab = test_support::lab(&pool, "lab-b").await;
        let inviter = test_support::user(&pool, "owner@lab.test").await;

        let invitation = invite(&pool, lab, inviter.id, "x@lab.test", LabMemberRole::Admin, HOUR_MS)
            .await
            .unwrap();
        let err = cancel(&pool, other_lab, invitation.id).await.unwrap_err();
        assert_eq!(app_code(err), ErrorCode::InvitationNotFound);

        cancel(&pool, lab, invitation.id).await.unwrap();
        let err = cancel(&pool, lab, invitation.id).await.unwrap_err();
        assert_eq!(app_code(err), ErrorCode::InvitationNotPending);
    }
}
