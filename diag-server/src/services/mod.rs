//! Multi-step operations
//!
//! Each public function here runs its writes inside one transaction and
//! returns `ServiceError`, so handlers stay thin.

pub mod catalog;
pub mod ordering;
pub mod organization;
pub mod views;
pub mod workflow;
