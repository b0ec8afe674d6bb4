//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::LabNotFound
            | Self::LabTestNotFound
            | Self::OrderNotFound
            | Self::ItemNotAssignedToLab
            | Self::OrderNotAssignedToLab
            | Self::CategoryNotFound
            | Self::TestNotFound
            | Self::PackageNotFound
            | Self::FamilyMemberNotFound
            | Self::AddressNotFound
            | Self::InvitationNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::EmailAlreadyRegistered
            | Self::LabSlugExists
            | Self::CategorySlugExists
            | Self::TestCodeExists
            | Self::PackageSlugExists
            | Self::FamilyMemberInUse
            | Self::InvitationNotPending
            | Self::AlreadyLabMember => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::SessionExpired => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::NotLabMember
            | Self::LabManagerRequired
            | Self::InvitationEmailMismatch => StatusCode::FORBIDDEN,

            // 410 Gone
            Self::InvitationExpired => StatusCode::GONE,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (validation and business rules)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
