//! Usage-related types.
//!
//! This module contains the shapes returned by the Cursor usage endpoint:
//! - [`UsageSnapshot`] - Per-tier counters plus the billing anchor date
//! - [`ModelUsage`] - Counters for one model tier
//! - [`ModelTier`] - The fixed tiers the endpoint reports
//! - [`UsageLimit`] - A ceiling, or unlimited
//! - [`UsageReport`] - A snapshot stamped with its fetch time

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::billing::BillingCycleInfo;
use crate::error::CoreError;

// ============================================================================
// Model Tiers
// ============================================================================

/// Model tiers reported by the usage endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelTier {
    /// Premium requests (`gpt-4`). This is the tier shown in summaries.
    #[serde(rename = "gpt-4")]
    Gpt4,
    /// Legacy fast tier (`gpt-3.5-turbo`).
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    /// Long-context tier (`gpt-4-32k`).
    #[serde(rename = "gpt-4-32k")]
    Gpt4_32k,
}

impl ModelTier {
    /// Returns all tiers in display order.
    pub fn all() -> &'static [ModelTier] {
        &[ModelTier::Gpt4, ModelTier::Gpt35Turbo, ModelTier::Gpt4_32k]
    }

    /// Returns the key used for this tier in the response body.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Gpt4_32k => "gpt-4-32k",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ============================================================================
// Usage Limit
// ============================================================================

/// A request or token ceiling.
///
/// The endpoint reports `null` for unlimited plans and sometimes omits the
/// field entirely. Both collapse to [`UsageLimit::Unlimited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageLimit {
    /// A finite ceiling.
    Limited(u64),
    /// No ceiling.
    Unlimited,
}

impl UsageLimit {
    /// Returns true if there is no ceiling.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Returns the ceiling, if any.
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Limited(n) => Some(*n),
            Self::Unlimited => None,
        }
    }
}

impl From<Option<u64>> for UsageLimit {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Unlimited, Self::Limited)
    }
}

impl fmt::Display for UsageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str("∞"),
        }
    }
}

// ============================================================================
// Model Usage
// ============================================================================

/// Usage counters for a single model tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    /// Requests used in the current cycle.
    #[serde(default)]
    pub num_requests: u64,
    /// Requests used including overages.
    #[serde(default)]
    pub num_requests_total: u64,
    /// Tokens consumed in the current cycle.
    #[serde(default)]
    pub num_tokens: u64,
    /// Request ceiling; `None` means unlimited.
    #[serde(default)]
    pub max_request_usage: Option<u64>,
    /// Token ceiling; `None` means unlimited.
    #[serde(default)]
    pub max_token_usage: Option<u64>,
}

impl ModelUsage {
    /// Returns the request ceiling.
    pub fn request_limit(&self) -> UsageLimit {
        self.max_request_usage.into()
    }

    /// Returns the token ceiling.
    pub fn token_limit(&self) -> UsageLimit {
        self.max_token_usage.into()
    }

    /// Returns the percentage of the request ceiling used.
    ///
    /// `None` when unlimited or when the ceiling is zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn used_percent(&self) -> Option<f64> {
        match self.request_limit() {
            UsageLimit::Limited(limit) if limit > 0 => {
                Some((self.num_requests as f64 / limit as f64) * 100.0)
            }
            _ => None,
        }
    }

    /// Returns the requests left before the ceiling, if there is one.
    pub fn remaining_requests(&self) -> Option<u64> {
        self.max_request_usage
            .map(|limit| limit.saturating_sub(self.num_requests))
    }

    /// Returns `"<used>/<limit>"`, with `∞` for unlimited.
    pub fn summary(&self) -> String {
        format!("{}/{}", self.num_requests, self.request_limit())
    }
}

// ============================================================================
// Usage Snapshot
// ============================================================================

/// Usage as reported by the Cursor usage endpoint.
///
/// One instance per fetch; never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Premium tier counters.
    #[serde(rename = "gpt-4", default, skip_serializing_if = "Option::is_none")]
    pub gpt4: Option<ModelUsage>,
    /// Fast tier counters.
    #[serde(
        rename = "gpt-3.5-turbo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gpt35_turbo: Option<ModelUsage>,
    /// Long-context tier counters.
    #[serde(rename = "gpt-4-32k", default, skip_serializing_if = "Option::is_none")]
    pub gpt4_32k: Option<ModelUsage>,
    /// Billing anchor (ISO-8601 date or date-time).
    #[serde(rename = "startOfMonth")]
    pub start_of_month: String,
}

impl UsageSnapshot {
    /// Creates a snapshot with no tier data.
    pub fn new(start_of_month: impl Into<String>) -> Self {
        Self {
            gpt4: None,
            gpt35_turbo: None,
            gpt4_32k: None,
            start_of_month: start_of_month.into(),
        }
    }

    /// Parses a snapshot from a JSON response body.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if the body is not a usage object.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Returns the counters for a tier.
    pub fn tier(&self, tier: ModelTier) -> Option<&ModelUsage> {
        match tier {
            ModelTier::Gpt4 => self.gpt4.as_ref(),
            ModelTier::Gpt35Turbo => self.gpt35_turbo.as_ref(),
            ModelTier::Gpt4_32k => self.gpt4_32k.as_ref(),
        }
    }

    /// Iterates over the tiers present in this snapshot.
    pub fn tiers(&self) -> impl Iterator<Item = (ModelTier, &ModelUsage)> {
        ModelTier::all()
            .iter()
            .filter_map(|tier| self.tier(*tier).map(|usage| (*tier, usage)))
    }

    /// Returns true if the premium tier is present.
    ///
    /// A snapshot without it cannot drive the usage summary.
    pub fn has_primary_tier(&self) -> bool {
        self.gpt4.is_some()
    }

    /// Returns the premium tier summary, e.g. `"5/500"` or `"12/∞"`.
    pub fn primary_summary(&self) -> Option<String> {
        self.gpt4.as_ref().map(ModelUsage::summary)
    }

    /// Computes the billing cycle from the anchor date against the current time.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the anchor cannot be parsed.
    pub fn billing_cycle(&self) -> Result<BillingCycleInfo, CoreError> {
        BillingCycleInfo::compute(&self.start_of_month)
    }
}

// ============================================================================
// Usage Report
// ============================================================================

/// A usage snapshot together with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// The fetched usage.
    pub usage_info: UsageSnapshot,
    /// When the fetch completed.
    pub last_updated: DateTime<Utc>,
}

impl UsageReport {
    /// Wraps a snapshot, stamping it with the current time.
    pub fn new(usage_info: UsageSnapshot) -> Self {
        Self {
            usage_info,
            last_updated: Utc::now(),
        }
    }

    /// Computes the billing cycle for this report.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the anchor cannot be parsed.
    pub fn billing_cycle(&self) -> Result<BillingCycleInfo, CoreError> {
        self.usage_info.billing_cycle()
    }
}

// ============================================================================
// Tests
// ============================================================================
