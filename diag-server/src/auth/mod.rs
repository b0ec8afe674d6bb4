//! Authentication: session tokens, role guards and rate limiting

pub mod jwt;
pub mod rate_limit;
pub mod roles;
pub mod session;

pub use jwt::{JwtError, JwtService};
pub use roles::{AdminUser, LabStaff};
pub use session::CurrentUser;
