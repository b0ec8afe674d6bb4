//! Signed-in user extraction
//!
//! The session JWT is read from `Authorization: Bearer` or the
//! `diag_session` cookie, then checked against the `sessions` table.

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::models::UserRole;

use super::jwt::{JwtError, JwtService};
use crate::db;
use crate::error::ServiceError;
use crate::security_log;
use crate::state::AppState;
use crate::utils::sha256_hex;

pub const SESSION_COOKIE: &str = "diag_session";

/// The caller, resolved from a live session
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub session_id: i64,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Value of one cookie from the `Cookie` header
pub fn cookie_value<'a>(headers: &'a http::HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
}

/// Session JWT from the bearer header, falling back to the cookie
pub fn session_token(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .or_else(|| cookie_value(headers, SESSION_COOKIE))
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let Some(token) = session_token(&parts.headers) else {
            security_log!(WARN, "auth_missing", uri = %parts.uri);
            return Err(AppError::not_authenticated().into());
        };

        let claims = match state.jwt.validate(token) {
            Ok(claims) => claims,
            Err(e) => {
                security_log!(WARN, "auth_failed", error = %e, uri = %parts.uri);
                let code = match e {
                    JwtError::ExpiredToken => ErrorCode::TokenExpired,
                    _ => ErrorCode::TokenInvalid,
                };
                return Err(AppError::new(code).into());
            }
        };

        let now = shared::util::now_millis();
        let session = db::sessions::find_active(&state.pool, &sha256_hex(&claims.sid), now).await?;
        let Some(session) = session.filter(|s| Some(s.user_id) == claims.user_id()) else {
            security_log!(WARN, "session_invalid", uri = %parts.uri);
            return Err(AppError::new(ErrorCode::SessionExpired).into());
        };

        let Some(user) = db::users::find_by_id(&state.pool, session.user_id).await? else {
            return Err(AppError::new(ErrorCode::SessionExpired).into());
        };

        let current = CurrentUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            session_id: session.id,
        };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_header_or_cookie() {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            "theme=dark; diag_session=cookie-jwt".parse().unwrap(),
        );
        assert_eq!(session_token(&headers), Some("cookie-jwt"));

        headers.insert(http::header::AUTHORIZATION, "Bearer header-jwt".parse().unwrap());
        assert_eq!(session_token(&headers), Some("header-jwt"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = http::HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(http::header::COOKIE, "diag_session=".parse().unwrap());
        assert_eq!(session_token(&headers), None);
    }
}
