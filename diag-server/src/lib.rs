//! diag-server: home-diagnostics booking service
//!
//! Patients book lab tests, admins curate the catalog and assign labs,
//! labs collect samples and upload reports. Each order carries an
//! append-only status history that drives the patient timeline.
//!
//! # Module layout
//!
//! ```text
//! diag-server/src/
//! ├── api/        # axum routers and handlers, grouped by area
//! ├── auth/       # JWT sessions, role resolution, rate limiting
//! ├── db/         # SQLite queries, one module per aggregate
//! ├── services/   # multi-step operations that run in one transaction
//! ├── utils/      # logger, validation, password hashing
//! ├── config.rs   # environment configuration
//! ├── error.rs    # ServiceError bridge to AppError
//! └── state.rs    # shared application state
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod utils;

pub use api::create_router;
pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;

/// Security event log (target `security`)
///
/// ```ignore
/// security_log!(WARN, "auth_failed", email = %email, reason = "invalid_password");
/// security_log!(WARN, "role_denied", user_id = user.id, required = "admin");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            level = "WARN",
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            level = "INFO",
            $($arg)*
        );
    };
}
