//! Shared types for the diagnostics booking platform
//!
//! Error codes and response envelope, domain models, the order timeline
//! projection and small utilities used by the server and its clients.

pub mod error;
pub mod models;
pub mod timeline;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
