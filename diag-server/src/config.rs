//! Server configuration
//!
//! | Variable              | Default           |
//! |-----------------------|-------------------|
//! | `DATABASE_URL`        | `sqlite:diag.db`  |
//! | `HTTP_PORT`           | `8080`            |
//! | `ENVIRONMENT`         | `development`     |
//! | `JWT_SECRET`          | required outside development |
//! | `SESSION_TTL_HOURS`   | `168`             |
//! | `INVITATION_TTL_HOURS`| `48`              |
//! | `ADMIN_EMAILS`        | empty             |
//! | `LOG_LEVEL`           | `info`            |
//! | `LOG_DIR`             | unset (stdout)    |
//! | `SEED_DEMO_DATA`      | `false`           |
//! | `TRUST_FORWARDED_FOR` | `false`           |

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub invitation_ttl_hours: i64,
    /// Registering with one of these (lower-cased) grants the admin role
    pub admin_emails: Vec<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
    /// Seed the demo catalog when the database is empty
    pub seed_demo_data: bool,
    /// Take the client IP from `X-Forwarded-For`; only behind a proxy that sets it
    pub trust_forwarded_for: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:diag.db".into()),
            http_port: Self::parse_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            environment,
            session_ttl_hours: Self::parse_or("SESSION_TTL_HOURS", 168),
            invitation_ttl_hours: Self::parse_or("INVITATION_TTL_HOURS", 48),
            admin_emails: parse_email_list(&std::env::var("ADMIN_EMAILS").unwrap_or_default()),
            log_level: std::env::var("LOG_LEVEL").ok().filter(|s| !s.is_empty()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            seed_demo_data: env_flag("SEED_DEMO_DATA"),
            trust_forwarded_for: env_flag("TRUST_FORWARDED_FOR"),
        })
    }

    /// In-memory configuration for tests
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "development".into(),
            jwt_secret: "test-secret-with-enough-entropy-0123456789".into(),
            session_ttl_hours: 1,
            invitation_ttl_hours: 48,
            admin_emails: vec!["admin@diag.test".into()],
            log_level: None,
            log_dir: None,
            seed_demo_data: false,
            // Router tests give each simulated client its own forwarded address
            trust_forwarded_for: true,
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(std::env::var(name).as_deref(), Ok("1" | "true" | "yes"))
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
