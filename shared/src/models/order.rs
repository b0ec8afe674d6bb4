//! Order Models
//!
//! Orders move through `pending → confirmed → assigned → collected →
//! processing → completed`; `cancelled` is terminal and reachable from
//! any status. Admins may set any status, labs only the ones they work on.

use super::{Address, Lab};
use crate::timeline::OrderTimeline;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Assigned,
    Collected,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in workflow order with `Cancelled` last
    pub const ALL: [OrderStatus; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Assigned,
        Self::Collected,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Statuses a lab may move its own orders into
    pub const LAB_SETTABLE: [OrderStatus; 3] =
        [Self::Collected, Self::Processing, Self::Completed];

    /// Position in the workflow (1-based); `None` for `Cancelled`
    pub fn step(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(1),
            Self::Confirmed => Some(2),
            Self::Assigned => Some(3),
            Self::Collected => Some(4),
            Self::Processing => Some(5),
            Self::Completed => Some(6),
            Self::Cancelled => None,
        }
    }

    /// Patient-facing label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Booked",
            Self::Confirmed => "Confirmed",
            Self::Assigned => "Collector Assigned",
            Self::Collected => "Sample Collected",
            Self::Processing => "Processing",
            Self::Completed => "Report Ready",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Assigned => "assigned",
            Self::Collected => "collected",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_lab_settable(&self) -> bool {
        Self::LAB_SETTABLE.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderItemType {
    Test,
    Package,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderItemStatus {
    #[default]
    Pending,
    Completed,
    Reported,
    Cancelled,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    /// `YYYY-MM-DD`
    pub scheduled_date: String,
    pub scheduled_time_slot: String,
    pub address_id: Option<i64>,
    pub assigned_lab_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order item joined with the booked test/package name and the patient
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_type: OrderItemType,
    pub test_id: Option<i64>,
    pub package_id: Option<i64>,
    pub name: String,
    pub price: f64,
    pub patient_id: Option<i64>,
    pub patient_name: Option<String>,
    pub status: OrderItemStatus,

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// Uploaded lab report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Report {
    pub id: i64,
    pub order_item_id: i64,
    pub file_url: String,
    pub notes: Option<String>,
    pub uploaded_by_lab_id: Option<i64>,
    pub uploaded_at: i64,
}

/// Report joined with what it belongs to (patient report list)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReportSummary {
    pub id: i64,
    pub order_id: i64,
    pub order_item_id: i64,
    pub item_name: String,
    pub patient_name: Option<String>,
    pub lab_name: Option<String>,
    pub file_url: String,
    pub notes: Option<String>,
    pub uploaded_at: i64,
}

/// Append-only status history row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    pub changed_by: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Order list row (patient booking summary, admin and lab lists)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderSummary {
    pub id: i64,
    pub user_id: i64,
    pub customer_name: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub scheduled_date: String,
    pub scheduled_time_slot: String,
    pub address_id: Option<i64>,
    pub assigned_lab_id: Option<i64>,
    pub lab_name: Option<String>,
    pub item_count: i64,
    pub created_at: i64,
}

/// Full order view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub customer_name: String,
    pub address: Option<Address>,
    pub lab: Option<Lab>,
    pub items: Vec<OrderItem>,
    /// Ascending by time
    pub history: Vec<StatusHistoryEntry>,
    pub timeline: OrderTimeline,
}

// ==================== Requests ====================

/// One cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "type")]
    pub item_type: OrderItemType,
    pub id: i64,
}

/// Who the samples are collected from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatientInput {
    Existing { family_member_id: i64 },
    New(super::FamilyMemberCreate),
}

/// Where the samples are collected
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Existing { address_id: i64 },
    New(super::AddressCreate),
}

/// Place-order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub patient: PatientInput,
    pub address: AddressInput,
    /// `YYYY-MM-DD`
    pub scheduled_date: String,
    pub scheduled_time_slot: String,
    pub items: Vec<CartLine>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: i64,
    pub total_amount: f64,
    pub redirect_to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignLabRequest {
    pub lab_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReportRequest {
    pub order_item_id: i64,
    pub file_url: String,
    pub notes: Option<String>,
}

// ==================== Dashboards ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Admin dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_orders: i64,
    pub orders_by_status: Vec<StatusCount>,
    /// Sum over completed orders
    pub revenue: f64,
    pub labs: i64,
    pub tests: i64,
    pub packages: i64,
}

/// Patient dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub total_orders: i64,
    pub active_orders: i64,
    pub reports: i64,
    pub family_members: i64,
    pub recent_orders: Vec<OrderSummary>,
}

/// Lab-side view of an assigned order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabOrder {
    pub order: OrderSummary,
    pub items: Vec<OrderItem>,
    pub address: Option<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_ordered() {
        let steps: Vec<u8> = OrderStatus::ALL.iter().filter_map(|s| s.step()).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(OrderStatus::Cancelled.step(), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(OrderStatus::Pending.label(), "Booked");
        assert_eq!(OrderStatus::Assigned.label(), "Collector Assigned");
        assert_eq!(OrderStatus::Completed.label(), "Report Ready");
    }

    #[test]
    fn test_lab_settable() {
        assert!(OrderStatus::Collected.is_lab_settable());
        assert!(OrderStatus::Completed.is_lab_settable());
        assert!(!OrderStatus::Assigned.is_lab_settable());
        assert!(!OrderStatus::Cancelled.is_lab_settable());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
        assert_eq!(OrderStatus::Collected.to_string(), "collected");
    }

    #[test]
    fn test_cart_line_wire_format() {
        let line: CartLine = serde_json::from_str(r#"{"type":"package","id":7}"#).unwrap();
        assert_eq!(line.item_type, OrderItemType::Package);
        assert_eq!(line.id, 7);
    }

    #[test]
    fn test_patient_input_untagged() {
        let p: PatientInput = serde_json::from_str(r#"{"family_member_id":3}"#).unwrap();
        assert!(matches!(p, PatientInput::Existing { family_member_id: 3 }));

        let p: PatientInput =
            serde_json::from_str(r#"{"name":"Rahim","gender":"male"}"#).unwrap();
        match p {
            PatientInput::New(m) => assert_eq!(m.name, "Rahim"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
