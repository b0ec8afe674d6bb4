//! Application state

use sqlx::SqlitePool;

use crate::auth::jwt::JwtService;
use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Session token signing/verification
    pub jwt: JwtService,
    pub session_ttl_ms: i64,
    pub invitation_ttl_ms: i64,
    /// Lower-cased emails that receive the admin role on sign-up
    pub admin_emails: Vec<String>,
    /// Cookies get `Secure` outside development
    pub secure_cookies: bool,
    /// Rate limiter for sign-in/sign-up routes
    pub rate_limiter: RateLimiter,
    /// Client IP from `X-Forwarded-For` instead of the peer address
    pub trust_forwarded_for: bool,
}

const HOUR_MS: i64 = 60 * 60 * 1000;

impl AppState {
    /// Connect, migrate and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = db::connect(&config.database_url).await?;
        Ok(Self::with_pool(pool, config))
    }

    /// Build the state around an existing pool (tests use an in-memory one)
    pub fn with_pool(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            jwt: JwtService::new(&config.jwt_secret),
            session_ttl_ms: config.session_ttl_hours * HOUR_MS,
            invitation_ttl_ms: config.invitation_ttl_hours * HOUR_MS,
            admin_emails: config.admin_emails.clone(),
            secure_cookies: config.environment != "development",
            rate_limiter: RateLimiter::new(),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}
