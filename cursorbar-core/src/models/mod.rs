//! Domain models for CursorBar.
//!
//! ## Submodules
//!
//! - [`usage`] - Usage types (UsageSnapshot, ModelUsage, UsageLimit, UsageReport)
//! - [`billing`] - Billing-cycle projection (BillingCycleInfo)

mod billing;
mod usage;

// Re-export everything at the models level
pub use billing::{BillingCycleInfo, parse_anchor_date};
pub use usage::{ModelTier, ModelUsage, UsageLimit, UsageReport, UsageSnapshot};
#[cfg(test)]
mod serde_tests;
