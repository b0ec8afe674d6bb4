//! Error codes for the diagnostics booking platform
//!
//! Codes are grouped by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Lab errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 7xxx: Patient errors
//! - 8xxx: Invitation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried by every API failure
///
/// Serialized as a bare u16 so clients can switch on the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from the same client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// Not authenticated
    NotAuthenticated = 1001,
    /// Invalid email or password
    InvalidCredentials = 1002,
    /// Token expired
    TokenExpired = 1003,
    /// Token invalid
    TokenInvalid = 1004,
    /// Session expired or revoked
    SessionExpired = 1005,
    /// Email already registered
    EmailAlreadyRegistered = 1006,
    /// Password too short
    PasswordTooShort = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Caller is not a member of any lab
    NotLabMember = 2101,
    /// Lab owner or admin role required
    LabManagerRequired = 2102,

    // ==================== 3xxx: Lab ====================
    /// Lab not found
    LabNotFound = 3001,
    /// Lab slug already exists
    LabSlugExists = 3002,
    /// Lab test offering not found
    LabTestNotFound = 3101,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4003,
    /// Status is not one a lab may set
    InvalidStatusTransition = 4004,
    /// Order item is not assigned to the caller's lab
    ItemNotAssignedToLab = 4005,
    /// Order is not assigned to the caller's lab
    OrderNotAssignedToLab = 4006,
    /// Scheduled date lies in the past
    ScheduledDateInPast = 4007,
    /// Test is not offered by any lab
    TestNotOffered = 4008,

    // ==================== 6xxx: Catalog ====================
    /// Test category not found
    CategoryNotFound = 6001,
    /// Test category slug already exists
    CategorySlugExists = 6002,
    /// Test not found
    TestNotFound = 6101,
    /// Test code already exists
    TestCodeExists = 6102,
    /// Package not found
    PackageNotFound = 6201,
    /// Package slug already exists
    PackageSlugExists = 6202,

    // ==================== 7xxx: Patient ====================
    /// Family member not found
    FamilyMemberNotFound = 7001,
    /// Family member is referenced by orders
    FamilyMemberInUse = 7002,
    /// Address not found
    AddressNotFound = 7101,

    // ==================== 8xxx: Invitation ====================
    /// Invitation not found
    InvitationNotFound = 8001,
    /// Invitation expired
    InvitationExpired = 8002,
    /// Invitation already accepted or canceled
    InvitationNotPending = 8003,
    /// Invitation addressed to another email
    InvitationEmailMismatch = 8004,
    /// User already belongs to a lab
    AlreadyLabMember = 8005,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, please retry later",

            // Auth
            ErrorCode::NotAuthenticated => "Unauthorized",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::NotLabMember => "Not a lab partner",
            ErrorCode::LabManagerRequired => "Lab owner or admin role is required",

            // Lab
            ErrorCode::LabNotFound => "Lab not found",
            ErrorCode::LabSlugExists => "Lab slug already exists",
            ErrorCode::LabTestNotFound => "Lab test not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::InvalidStatusTransition => "Status cannot be set by a lab",
            ErrorCode::ItemNotAssignedToLab => "Order item not found or not assigned to your lab",
            ErrorCode::OrderNotAssignedToLab => "Order not found or not assigned to your lab",
            ErrorCode::ScheduledDateInPast => "Scheduled date cannot be in the past",
            ErrorCode::TestNotOffered => "Test is not offered by any lab",

            // Catalog
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategorySlugExists => "Category slug already exists",
            ErrorCode::TestNotFound => "Test not found",
            ErrorCode::TestCodeExists => "Test code already exists",
            ErrorCode::PackageNotFound => "Package not found",
            ErrorCode::PackageSlugExists => "Package slug already exists",

            // Patient
            ErrorCode::FamilyMemberNotFound => "Family member not found",
            ErrorCode::FamilyMemberInUse => "Family member has orders",
            ErrorCode::AddressNotFound => "Address not found",

            // Invitation
            ErrorCode::InvitationNotFound => "Invitation not found",
            ErrorCode::InvitationExpired => "Invitation has expired",
            ErrorCode::InvitationNotPending => "Invitation is no longer pending",
            ErrorCode::InvitationEmailMismatch => "Invitation was sent to a different email",
            ErrorCode::AlreadyLabMember => "User already belongs to a lab",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1006 => Ok(ErrorCode::EmailAlreadyRegistered),
            1007 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2101 => Ok(ErrorCode::NotLabMember),
            2102 => Ok(ErrorCode::LabManagerRequired),

            // Lab
            3001 => Ok(ErrorCode::LabNotFound),
            3002 => Ok(ErrorCode::LabSlugExists),
            3101 => Ok(ErrorCode::LabTestNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4003 => Ok(ErrorCode::OrderEmpty),
            4004 => Ok(ErrorCode::InvalidStatusTransition),
            4005 => Ok(ErrorCode::ItemNotAssignedToLab),
            4006 => Ok(ErrorCode::OrderNotAssignedToLab),
            4007 => Ok(ErrorCode::ScheduledDateInPast),
            4008 => Ok(ErrorCode::TestNotOffered),

            // Catalog
            6001 => Ok(ErrorCode::CategoryNotFound),
            6002 => Ok(ErrorCode::CategorySlugExists),
            6101 => Ok(ErrorCode::TestNotFound),
            6102 => Ok(ErrorCode::TestCodeExists),
            6201 => Ok(ErrorCode::PackageNotFound),
            6202 => Ok(ErrorCode::PackageSlugExists),

            // Patient
            7001 => Ok(ErrorCode::FamilyMemberNotFound),
            7002 => Ok(ErrorCode::FamilyMemberInUse),
            7101 => Ok(ErrorCode::AddressNotFound),

            // Invitation
            8001 => Ok(ErrorCode::InvitationNotFound),
            8002 => Ok(ErrorCode::InvitationExpired),
            8003 => Ok(ErrorCode::InvitationNotPending),
            8004 => Ok(ErrorCode::InvitationEmailMismatch),
            8005 => Ok(ErrorCode::AlreadyLabMember),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
