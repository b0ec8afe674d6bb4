//! Role guards and post-sign-in routing

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::models::{LabMemberRole, UserRole};

use super::session::CurrentUser;
use crate::db;
use crate::error::ServiceError;
use crate::security_log;
use crate::state::AppState;

/// Callback paths a sign-in may redirect to
pub const CALLBACK_ALLOW_LIST: [&str; 8] = [
    "/dashboard",
    "/admin/dashboard",
    "/lab/dashboard",
    "/orders",
    "/reports",
    "/profile",
    "/cart",
    "/family",
];

/// Landing page for a user: admins first, then lab staff, then patients
pub fn dashboard_path(role: UserRole, lab_id: Option<i64>) -> &'static str {
    match (role, lab_id) {
        (UserRole::Admin, _) => "/admin/dashboard",
        (_, Some(_)) => "/lab/dashboard",
        _ => "/dashboard",
    }
}

/// Requested callback if it is on the allow-list, else `fallback`
pub fn resolve_callback_url(requested: Option<&str>, fallback: &str) -> String {
    requested
        .map(str::trim)
        .filter(|url| CALLBACK_ALLOW_LIST.contains(url))
        .unwrap_or(fallback)
        .to_string()
}

/// Caller with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            security_log!(WARN, "role_denied", user_id = user.id, required = "admin", uri = %parts.uri);
            return Err(AppError::new(ErrorCode::AdminRequired).into());
        }
        Ok(Self(user))
    }
}

/// Caller who belongs to a lab, with that lab resolved
#[derive(Debug, Clone)]
pub struct LabStaff {
    pub user: CurrentUser,
    pub lab_id: i64,
    pub role: LabMemberRole,
}

impl LabStaff {
    /// Owners and admins manage the team, prices and settings
    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.role.can_manage() {
            Ok(())
        } else {
            security_log!(
                WARN,
                "role_denied",
                user_id = self.user.id,
                lab_id = self.lab_id,
                required = "lab_manager"
            );
            Err(AppError::new(ErrorCode::LabManagerRequired))
        }
    }
}

impl FromRequestParts<AppState> for LabStaff {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let Some((lab_id, role)) = db::labs::membership_for_user(&state.pool, user.id).await?
        else {
            security_log!(WARN, "role_denied", user_id = user.id, required = "lab_member", uri = %parts.uri);
            return Err(AppError::new(ErrorCode::NotLabMember).into());
        };
        Ok(Self { user, lab_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_path() {
        assert_eq!(dashboard_path(UserRole::Admin, Some(1)), "/admin/dashboard");
        assert_eq!(dashboard_path(UserRole::User, Some(1)), "/lab/dashboard");
        assert_eq!(dashboard_path(UserRole::User, None), "/dashboard");
    }

    #[test]
    fn test_callback_allow_list() {
        assert_eq!(resolve_callback_url(Some("/orders"), "/dashboard"), "/orders");
        assert_eq!(
            resolve_callback_url(Some("https://evil.example/phish"), "/dashboard"),
            "/dashboard"
        );
        assert_eq!(resolve_callback_url(Some("/orders/../admin"), "/lab/dashboard"), "/lab/dashboard");
        assert_eq!(resolve_callback_url(None, "/dashboard"), "/dashboard");
    }

    #[test]
    fn test_member_cannot_manage() {
        let staff = |role| LabStaff {
            user: CurrentUser {
                id: 1,
                name: "Lab".into(),
                email: "lab@x.io".into(),
                role: UserRole::User,
                session_id: 1,
            },
            lab_id: 9,
            role,
        };
        assert!(staff(LabMemberRole::Owner).require_manager().is_ok());
        assert!(staff(LabMemberRole::Admin).require_manager().is_ok());
        assert_eq!(
            staff(LabMemberRole::Member).require_manager().unwrap_err().code,
            ErrorCode::LabManagerRequired
        );
    }
}
