// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `CursorBar` Core
//!
//! Core types and models for the `CursorBar` application.
//!
//! This crate provides the data products the rest of the workspace passes
//! around:
//!
//! - Usage models as returned by the Cursor usage endpoint
//! - The billing-cycle projection derived from the usage anchor date
//! - Error types
//!
//! ## Key Types
//!
//! ### Usage Types
//! - [`UsageSnapshot`] - Per-tier request/token counters plus the billing anchor
//! - [`ModelUsage`] - Counters for a single model tier
//! - [`ModelTier`] - The fixed set of tiers the endpoint reports
//! - [`UsageLimit`] - Request/token ceiling, or unlimited
//! - [`UsageReport`] - A snapshot stamped with its fetch time
//!
//! ### Billing
//! - [`BillingCycleInfo`] - Cycle start, renewal date, and days remaining

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Billing
    BillingCycleInfo,
    parse_anchor_date,
    // Usage types
    ModelTier,
    ModelUsage,
    UsageLimit,
    UsageReport,
    UsageSnapshot,
};
