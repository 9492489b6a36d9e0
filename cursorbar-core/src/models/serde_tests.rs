//! Serde tests for the usage wire format.
//!
//! The usage endpoint's JSON shape is fixed by the server; these tests pin
//! the field names and the null/absent handling of ceilings.

use chrono::{TimeZone, Utc};

use crate::{BillingCycleInfo, ModelTier, UsageLimit, UsageReport, UsageSnapshot};

// ============================================================================
// UsageSnapshot Deserialization
// ============================================================================

#[test]
fn test_full_usage_response() {
    let json = r#"{
        "gpt-4": {
            "numRequests": 123,
            "numRequestsTotal": 130,
            "numTokens": 456789,
            "maxRequestUsage": 500,
            "maxTokenUsage": null
        },
        "gpt-3.5-turbo": {
            "numRequests": 7,
            "numRequestsTotal": 7,
            "numTokens": 1000,
            "maxRequestUsage": null,
            "maxTokenUsage": null
        },
        "gpt-4-32k": {
            "numRequests": 0,
            "numRequestsTotal": 0,
            "numTokens": 0,
            "maxRequestUsage": 50,
            "maxTokenUsage": null
        },
        "startOfMonth": "2024-06-01T09:12:44.000Z"
    }"#;

    let snapshot = UsageSnapshot::from_json(json).unwrap();

    let gpt4 = snapshot.tier(ModelTier::Gpt4).unwrap();
    assert_eq!(gpt4.num_requests, 123);
    assert_eq!(gpt4.num_requests_total, 130);
    assert_eq!(gpt4.num_tokens, 456_789);
    assert_eq!(gpt4.request_limit(), UsageLimit::Limited(500));
    assert_eq!(gpt4.token_limit(), UsageLimit::Unlimited);

    let turbo = snapshot.tier(ModelTier::Gpt35Turbo).unwrap();
    assert_eq!(turbo.request_limit(), UsageLimit::Unlimited);

    assert_eq!(snapshot.gpt4_32k.as_ref().unwrap().max_request_usage, Some(50));
    assert_eq!(snapshot.start_of_month, "2024-06-01T09:12:44.000Z");
}

#[test]
fn test_null_and_absent_ceiling_are_the_same() {
    let with_null = r#"{"gpt-4":{"numRequests":3,"maxRequestUsage":null},"startOfMonth":"2024-06-01"}"#;
    let absent = r#"{"gpt-4":{"numRequests":3},"startOfMonth":"2024-06-01"}"#;

    let a = UsageSnapshot::from_json(with_null).unwrap();
    let b = UsageSnapshot::from_json(absent).unwrap();

    assert_eq!(a, b);
    assert!(a.gpt4.unwrap().request_limit().is_unlimited());
}

#[test]
fn test_missing_tiers_are_none() {
    let json = r#"{"gpt-4":{"numRequests":5,"maxRequestUsage":500},"startOfMonth":"2024-06-01"}"#;
    let snapshot = UsageSnapshot::from_json(json).unwrap();

    assert!(snapshot.has_primary_tier());
    assert!(snapshot.gpt35_turbo.is_none());
    assert!(snapshot.gpt4_32k.is_none());
    assert_eq!(snapshot.tiers().count(), 1);
}

#[test]
fn test_unknown_fields_ignored() {
    let json = r#"{"gpt-4":{"numRequests":1,"extra":true},"claude-3":{},"startOfMonth":"2024-06-01"}"#;
    assert!(UsageSnapshot::from_json(json).is_ok());
}

#[test]
fn test_missing_anchor_rejected() {
    let json = r#"{"gpt-4":{"numRequests":1}}"#;
    assert!(UsageSnapshot::from_json(json).is_err());
}

#[test]
fn test_non_object_rejected() {
    assert!(UsageSnapshot::from_json("<html>login</html>").is_err());
    assert!(UsageSnapshot::from_json("[]").is_err());
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_snapshot_serializes_wire_names() {
    let json = r#"{"gpt-4":{"numRequests":5,"maxRequestUsage":500},"startOfMonth":"2024-06-01"}"#;
    let snapshot = UsageSnapshot::from_json(json).unwrap();
    let value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value["gpt-4"]["numRequests"], 5);
    assert_eq!(value["gpt-4"]["maxRequestUsage"], 500);
    assert!(value["gpt-4"]["maxTokenUsage"].is_null());
    assert!(value.get("gpt-3.5-turbo").is_none());
    assert_eq!(value["startOfMonth"], "2024-06-01");
}

#[test]
fn test_report_field_names() {
    let report = UsageReport {
        usage_info: UsageSnapshot::new("2024-06-01"),
        last_updated: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
    };
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["usageInfo"]["startOfMonth"], "2024-06-01");
    assert_eq!(value["lastUpdated"], "2024-06-10T12:00:00Z");
}

#[test]
fn test_billing_cycle_field_names() {
    let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
    let info = BillingCycleInfo::compute_at("2024-06-01", now).unwrap();
    let value = serde_json::to_value(info).unwrap();

    assert_eq!(value["daysRemaining"], 21);
    assert_eq!(value["nextRenewal"], "2024-07-01T00:00:00Z");
    assert!(value.get("startDate").is_some());
}
