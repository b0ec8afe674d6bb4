//! Authentication handlers

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use http::{Extensions, HeaderMap, header};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{MeResponse, SessionResponse, SignInRequest, SignUpRequest, User, UserRole};

use crate::api::ApiResult;
use crate::auth::rate_limit::client_ip;
use crate::auth::roles::{dashboard_path, resolve_callback_url};
use crate::auth::session::SESSION_COOKIE;
use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ServiceError, ServiceResult, conflict_or_db};
use crate::security_log;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_email, validate_email, validate_optional_text,
    validate_password, validate_required_text,
};
use crate::utils::{generate_token, hash_password, sha256_hex, verify_password};

fn session_cookie(state: &AppState, value: &str, max_age_secs: i64) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");
    if state.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Store a new session for `user` and answer with the signed token, both in
/// the body and as the session cookie
async fn start_session(
    state: &AppState,
    user: User,
    headers: &HeaderMap,
    extensions: &Extensions,
    callback_url: Option<&str>,
) -> ServiceResult<Response> {
    let now = shared::util::now_millis();
    let expires_at = now + state.session_ttl_ms;
    let session_token = generate_token();
    let ip = client_ip(headers, extensions, state.trust_forwarded_for);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    db::sessions::create(
        &state.pool,
        &sha256_hex(&session_token),
        user.id,
        expires_at,
        Some(&ip),
        user_agent,
        now,
    )
    .await?;

    let token = state
        .jwt
        .issue(user.id, &session_token, expires_at)
        .map_err(|e| {
            tracing::error!("JWT creation failed: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    let lab_id = db::labs::membership_for_user(&state.pool, user.id)
        .await?
        .map(|(lab_id, _)| lab_id);
    let redirect_to = resolve_callback_url(callback_url, dashboard_path(user.role, lab_id));

    security_log!(INFO, "sign_in", user_id = user.id, ip = %ip);

    let cookie = session_cookie(state, &token, state.session_ttl_ms / 1000);
    let body = SessionResponse {
        token,
        expires_at,
        user,
        redirect_to,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/auth/sign-up
///
/// Registers a patient account (or an admin, for configured emails) and
/// signs it in.
pub async fn sign_up(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    Json(req): Json<SignUpRequest>,
) -> Result<Response, ServiceError> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_email(req.email.trim(), "email")?;
    validate_password(&req.password)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let email = normalize_email(&req.email);
    let role = if state.is_admin_email(&email) {
        UserRole::Admin
    } else {
        UserRole::User
    };
    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let now = shared::util::now_millis();
    let user = db::users::create(
        &state.pool,
        req.name.trim(),
        &email,
        req.phone.as_deref().filter(|p| !p.is_empty()),
        role,
        &password_hash,
        now,
    )
    .await
    .map_err(|e| conflict_or_db(e, ErrorCode::EmailAlreadyRegistered))?;

    tracing::info!(user_id = user.id, role = ?user.role, "User registered");
    start_session(&state, user, &headers, &extensions, None).await
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    Json(req): Json<SignInRequest>,
) -> Result<Response, ServiceError> {
    let email = normalize_email(&req.email);
    let credentials = db::users::find_credentials(&state.pool, &email).await?;

    let Some(credentials) =
        credentials.filter(|c| verify_password(&req.password, &c.password_hash))
    else {
        security_log!(WARN, "auth_failed", email = %email, reason = "invalid_credentials");
        return Err(AppError::invalid_credentials().into());
    };

    let user = db::users::find_by_id(&state.pool, credentials.id)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    start_session(&state, user, &headers, &extensions, req.callback_url.as_deref()).await
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, ServiceError> {
    db::sessions::delete(&state.pool, user.session_id).await?;
    security_log!(INFO, "sign_out", user_id = user.id);

    let cookie = session_cookie(&state, "", 0);
    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::ok()).into_response())
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<MeResponse> {
    let profile = db::users::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SessionExpired))?;
    let membership = db::labs::membership_for_user(&state.pool, user.id).await?;
    let lab_id = membership.map(|(lab_id, _)| lab_id);

    Ok(Json(MeResponse {
        dashboard_path: dashboard_path(profile.role, lab_id).to_string(),
        lab_id,
        lab_role: membership.map(|(_, role)| role),
        user: profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_session_cookie_flags() {
        let pool = db::connect_in_memory().await.unwrap();
        let mut state = AppState::with_pool(pool, &Config::for_tests());

        let cookie = session_cookie(&state, "jwt", 3600);
        assert_eq!(cookie, "diag_session=jwt; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600");

        state.secure_cookies = true;
        assert!(session_cookie(&state, "", 0).ends_with("Max-Age=0; Secure"));
    }
}
