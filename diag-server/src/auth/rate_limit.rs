//! Per-IP rate limiting for the sign-in and sign-up routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

/// Sign-in attempts per IP per window
pub const SIGN_IN_LIMIT: u32 = 5;
/// Sign-up attempts per IP per window
pub const SIGN_UP_LIMIT: u32 = 3;
pub const WINDOW_SECS: u64 = 60;

/// Entries idle longer than this are dropped by [`RateLimiter::cleanup`]
const ENTRY_TTL: Duration = Duration::from_secs(300);

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop stale entries and empty route maps
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < ENTRY_TTL);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Client IP: the peer address, or the first `X-Forwarded-For` entry when
/// `trust_forwarded` is set. Without a trusted proxy the header is
/// client-controlled and ignored.
pub fn client_ip(
    headers: &http::HeaderMap,
    extensions: &http::Extensions,
    trust_forwarded: bool,
) -> String {
    if trust_forwarded
        && let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    extensions
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn too_many_requests(route: &str, ip: &str) -> Response {
    crate::security_log!(WARN, "rate_limited", route = %route, ip = %ip);
    AppError::new(ErrorCode::TooManyRequests).into_response()
}

async fn limit(
    state: &AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers(), request.extensions(), state.trust_forwarded_for);
    if !state
        .rate_limiter
        .check(route, &ip, max_requests, WINDOW_SECS)
        .await
    {
        return too_many_requests(route, &ip);
    }
    next.run(request).await
}

pub async fn sign_in_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    limit(&state, "sign_in", SIGN_IN_LIMIT, request, next).await
}

pub async fn sign_up_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    limit(&state, "sign_up", SIGN_UP_LIMIT, request, next).await
}
