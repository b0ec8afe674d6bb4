//! Lab Model
//!
//! A lab doubles as the organization that its staff belong to.

use serde::{Deserialize, Serialize};

/// Lifecycle of a lab organization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum LabStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

/// Role of a user inside a lab organization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum LabMemberRole {
    Owner,
    Admin,
    #[default]
    Member,
}

impl LabMemberRole {
    /// Owners and admins manage the team and the lab settings
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

/// Lab entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Lab {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    /// 0.0 - 5.0
    pub rating: f64,
    pub is_verified: bool,
    pub status: LabStatus,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub accreditations: Vec<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub service_areas: Vec<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create lab payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabCreate {
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub is_verified: Option<bool>,
    pub status: Option<LabStatus>,
    #[serde(default)]
    pub accreditations: Vec<String>,
    #[serde(default)]
    pub service_areas: Vec<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    /// Sends an owner invitation to this address
    pub owner_email: Option<String>,
}

/// Update lab payload (admin: every field; lab settings: contact fields only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabUpdate {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub is_verified: Option<bool>,
    pub status: Option<LabStatus>,
    pub accreditations: Option<Vec<String>>,
    pub service_areas: Option<Vec<String>>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

/// Lab member joined with user info
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LabMember {
    pub lab_id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: LabMemberRole,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Canceled,
    Expired,
}

/// Invitation to join a lab
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invitation {
    pub id: i64,
    pub lab_id: i64,
    pub email: String,
    pub role: LabMemberRole,
    pub status: InvitationStatus,
    pub inviter_id: Option<i64>,
    pub expires_at: i64,
    pub created_at: i64,
}

/// Invite payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationCreate {
    pub email: String,
    #[serde(default)]
    pub role: LabMemberRole,
}

/// Lab dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabStats {
    pub total_orders: i64,
    /// Orders in `assigned` or `confirmed`
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub reports_this_month: i64,
}
