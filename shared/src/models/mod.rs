//! Data models
//!
//! Shared between diag-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps UTC milliseconds.

pub mod catalog;
pub mod lab;
pub mod order;
pub mod patient;
pub mod user;

// Re-exports
pub use catalog::*;
pub use lab::*;
pub use order::*;
pub use patient::*;
pub use user::*;
