//! Order status timeline projection
//!
//! Turns the current status plus the history rows into the six-step view the
//! patient sees. Pure function of its inputs.

use crate::models::{OrderStatus, StatusHistoryEntry};
use serde::{Deserialize, Serialize};

/// One step of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub label: String,
    pub step: u8,
    /// Reached (or passed) and the order is not cancelled
    pub completed: bool,
    pub current: bool,
    /// Time of the first history entry with this status
    pub reached_at: Option<i64>,
    pub notes: Option<String>,
    /// Whether the connector to the next step is drawn filled
    pub connector_filled: bool,
}

/// Timeline for one order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTimeline {
    pub current: OrderStatus,
    pub badge: StatusBadge,
    pub steps: Vec<TimelineStep>,
    pub cancelled: bool,
    pub cancelled_at: Option<i64>,
    pub cancelled_notes: Option<String>,
}

/// Compact status label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub status: OrderStatus,
    pub label: String,
}

impl StatusBadge {
    pub fn new(status: OrderStatus) -> Self {
        Self {
            status,
            label: status.label().to_string(),
        }
    }
}

impl OrderTimeline {
    /// Build the timeline. `history` may be in any order; entries are matched
    /// to steps by status and the first appended (lowest id) wins.
    pub fn build(current: OrderStatus, history: &[StatusHistoryEntry]) -> Self {
        let cancelled = current == OrderStatus::Cancelled;
        // Cancelled has no position; nothing counts as passed.
        let current_step = current.step().unwrap_or(0);

        let first_entry = |status: OrderStatus| {
            history
                .iter()
                .filter(|h| h.status == status)
                .min_by_key(|h| h.id)
        };

        let steps = OrderStatus::ALL
            .iter()
            .filter_map(|status| status.step().map(|step| (*status, step)))
            .map(|(status, step)| {
                let completed = step <= current_step && !cancelled;
                let entry = first_entry(status);
                TimelineStep {
                    status,
                    label: status.label().to_string(),
                    step,
                    completed,
                    current: status == current,
                    reached_at: entry.map(|h| h.created_at),
                    notes: entry.and_then(|h| h.notes.clone()),
                    connector_filled: completed && step < current_step,
                }
            })
            .collect();

        let cancel_entry = first_entry(OrderStatus::Cancelled);

        Self {
            current,
            badge: StatusBadge::new(current),
            steps,
            cancelled,
            cancelled_at: cancel_entry.map(|h| h.created_at),
            cancelled_notes: cancel_entry.and_then(|h| h.notes.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, status: OrderStatus, at: i64, notes: Option<&str>) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id,
            order_id: 1,
            status,
            changed_by: None,
            notes: notes.map(str::to_string),
            created_at: at,
        }
    }

    #[test]
    fn test_six_steps_without_cancelled() {
        let t = OrderTimeline::build(OrderStatus::Pending, &[]);
        assert_eq!(t.steps.len(), 6);
        assert!(t.steps.iter().all(|s| s.status != OrderStatus::Cancelled));
        let labels: Vec<&str> = t.steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Booked",
                "Confirmed",
                "Collector Assigned",
                "Sample Collected",
                "Processing",
                "Report Ready"
            ]
        );
    }

    #[test]
    fn test_completed_and_connectors() {
        let t = OrderTimeline::build(OrderStatus::Assigned, &[]);
        let completed: Vec<bool> = t.steps.iter().map(|s| s.completed).collect();
        assert_eq!(completed, vec![true, true, true, false, false, false]);

        let filled: Vec<bool> = t.steps.iter().map(|s| s.connector_filled).collect();
        assert_eq!(filled, vec![true, true, false, false, false, false]);

        let current: Vec<bool> = t.steps.iter().map(|s| s.current).collect();
        assert_eq!(current, vec![false, false, true, false, false, false]);
        assert_eq!(t.badge.label, "Collector Assigned");
    }

    #[test]
    fn test_all_completed_at_end() {
        let t = OrderTimeline::build(OrderStatus::Completed, &[]);
        assert!(t.steps.iter().all(|s| s.completed));
        assert!(!t.steps[5].connector_filled);
        assert!(t.steps[4].connector_filled);
    }

    #[test]
    fn test_first_history_entry_wins() {
        let history = vec![
            entry(3, OrderStatus::Pending, 300, Some("re-opened")),
            entry(1, OrderStatus::Pending, 100, Some("Order placed")),
            entry(2, OrderStatus::Confirmed, 200, None),
        ];
        let t = OrderTimeline::build(OrderStatus::Confirmed, &history);
        assert_eq!(t.steps[0].reached_at, Some(100));
        assert_eq!(t.steps[0].notes.as_deref(), Some("Order placed"));
        assert_eq!(t.steps[1].reached_at, Some(200));
        assert_eq!(t.steps[2].reached_at, None);
    }

    #[test]
    fn test_cancelled_marks_nothing_completed() {
        let history = vec![
            entry(1, OrderStatus::Pending, 100, Some("Order placed")),
            entry(2, OrderStatus::Confirmed, 200, None),
            entry(3, OrderStatus::Cancelled, 300, Some("patient request")),
        ];
        let t = OrderTimeline::build(OrderStatus::Cancelled, &history);
        assert!(t.cancelled);
        assert_eq!(t.cancelled_at, Some(300));
        assert_eq!(t.cancelled_notes.as_deref(), Some("patient request"));
        assert!(t.steps.iter().all(|s| !s.completed && !s.current));
        assert!(t.steps.iter().all(|s| !s.connector_filled));
        // History is still shown against the steps it reached.
        assert_eq!(t.steps[1].reached_at, Some(200));
        assert_eq!(t.badge.label, "Cancelled");
    }

    #[test]
    fn test_backwards_move_recomputes_from_current() {
        // completed -> pending is legal for admins; the projection follows the current status
        let history = vec![
            entry(1, OrderStatus::Pending, 100, None),
            entry(2, OrderStatus::Completed, 200, None),
            entry(3, OrderStatus::Pending, 300, None),
        ];
        let t = OrderTimeline::build(OrderStatus::Pending, &history);
        assert!(t.steps[0].completed);
        assert!(!t.steps[5].completed);
        assert_eq!(t.steps[5].reached_at, Some(200));
    }
}
