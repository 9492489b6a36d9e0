//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use cursorbar_core::{ModelUsage, UsageLimit};
use cursorbar_providers::{CursorUsage, CycleError};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a successful fetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageOutput {
    /// `"<used>/<limit>"` for the gpt-4 tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// False when the gpt-4 tier is missing.
    pub complete: bool,
    pub tiers: Vec<TierOutput>,
    pub start_of_month: String,
    pub billing_cycle: BillingCycleOutput,
    #[serde(serialize_with = "serialize_datetime")]
    pub last_updated: DateTime<Utc>,
}

/// A single model tier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierOutput {
    pub model: String,
    pub num_requests: u64,
    pub num_requests_total: u64,
    pub num_tokens: u64,
    /// `null` means unlimited.
    pub max_request_usage: Option<u64>,
    pub max_token_usage: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_percent: Option<f64>,
    pub unlimited: bool,
}

/// Billing cycle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycleOutput {
    #[serde(serialize_with = "serialize_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "serialize_datetime")]
    pub next_renewal: DateTime<Utc>,
    pub days_remaining: i64,
    pub stale: bool,
}

/// JSON output for a failed fetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub stage: String,
    pub error: String,
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats usage and the billing cycle.
    pub fn format_usage(&self, usage: &CursorUsage) -> Result<String> {
        self.format(&Self::usage_to_output(usage))
    }

    /// Formats a failed fetch.
    pub fn format_error(&self, err: &CycleError) -> Result<String> {
        self.format(&ErrorOutput {
            stage: err.stage.to_string(),
            error: err.source_error().to_string(),
        })
    }

    fn usage_to_output(usage: &CursorUsage) -> UsageOutput {
        let snapshot = &usage.report.usage_info;
        let cycle = &usage.billing_cycle;

        UsageOutput {
            summary: snapshot.primary_summary(),
            complete: snapshot.has_primary_tier(),
            tiers: snapshot
                .tiers()
                .map(|(tier, model)| Self::tier_to_output(tier.wire_name(), model))
                .collect(),
            start_of_month: snapshot.start_of_month.clone(),
            billing_cycle: BillingCycleOutput {
                start_date: cycle.start_date,
                next_renewal: cycle.next_renewal,
                days_remaining: cycle.days_remaining,
                stale: cycle.is_stale(),
            },
            last_updated: usage.report.last_updated,
        }
    }

    fn tier_to_output(model_name: &str, model: &ModelUsage) -> TierOutput {
        TierOutput {
            model: model_name.to_string(),
            num_requests: model.num_requests,
            num_requests_total: model.num_requests_total,
            num_tokens: model.num_tokens,
            max_request_usage: model.max_request_usage,
            max_token_usage: model.max_token_usage,
            used_percent: model.used_percent(),
            unlimited: model.request_limit() == UsageLimit::Unlimited,
        }
    }
}
