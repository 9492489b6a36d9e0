//! Billing-cycle projection.
//!
//! The usage endpoint reports only the start of the current cycle
//! (`startOfMonth`). Everything else is derived here:
//!
//! - renewal is exactly one calendar month after the anchor, keeping the
//!   day-of-month and time-of-day; a day that does not exist in the target
//!   month rolls forward into the next one (Jan 31 -> Mar 2 in a leap year)
//! - days remaining is the ceiling of the time left, in days, and goes
//!   negative once the renewal has passed

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Billing facts derived from a usage anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycleInfo {
    /// Start of the current cycle.
    pub start_date: DateTime<Utc>,
    /// Start date advanced by one calendar month.
    pub next_renewal: DateTime<Utc>,
    /// Whole days until renewal, rounded up. Negative when stale.
    pub days_remaining: i64,
}

impl BillingCycleInfo {
    /// Computes the cycle against the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the anchor cannot be parsed.
    pub fn compute(anchor: &str) -> Result<Self, CoreError> {
        Self::compute_at(anchor, Utc::now())
    }

    /// Computes the cycle against a fixed `now`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the anchor cannot be parsed or the
    /// renewal date falls outside the representable range.
    pub fn compute_at(anchor: &str, now: DateTime<Utc>) -> Result<Self, CoreError> {
        let start_date = parse_anchor_date(anchor)?;
        let next_renewal = add_one_month(start_date).ok_or_else(|| {
            CoreError::InvalidDate(format!("renewal date for {anchor:?} is out of range"))
        })?;

        Ok(Self {
            start_date,
            next_renewal,
            days_remaining: ceil_days(next_renewal - now),
        })
    }

    /// Returns true once the renewal date has passed.
    ///
    /// The snapshot that produced this cycle is out of date and should be
    /// refetched.
    pub fn is_stale(&self) -> bool {
        self.days_remaining < 0
    }
}

/// Parses a billing anchor.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as
/// UTC), and plain `YYYY-MM-DD` dates (UTC midnight).
///
/// # Errors
///
/// Returns `CoreError::InvalidDate` if none of the formats match.
pub fn parse_anchor_date(anchor: &str) -> Result<DateTime<Utc>, CoreError> {
    let trimmed = anchor.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }

    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(CoreError::InvalidDate(format!(
        "unrecognized billing anchor {anchor:?}"
    )))
}

fn add_one_month(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let date = start.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    // Counting from the 1st lets an out-of-range day spill into the next month.
    let renewal = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(date.day() - 1)))?;

    Some(renewal.and_time(start.time()).and_utc())
}

fn ceil_days(delta: Duration) -> i64 {
    let millis = delta.num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

// ============================================================================
// Tests
// ============================================================================
