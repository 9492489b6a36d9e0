//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Local, Utc};
use cursorbar_core::{BillingCycleInfo, ModelTier, ModelUsage, UsageLimit};
use cursorbar_providers::CursorUsage;

use crate::commands::check::CheckReport;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats usage and the billing cycle.
    pub fn format_usage(&self, usage: &CursorUsage) -> String {
        let snapshot = &usage.report.usage_info;
        let mut lines = Vec::new();

        // Header: "Cursor  5/500"
        match snapshot.primary_summary() {
            Some(summary) => lines.push(format!("{}  {}", self.bold("Cursor"), summary)),
            None => lines.push(self.bold("Cursor")),
        }

        for (tier, model) in snapshot.tiers() {
            lines.push(self.format_tier(tier, model));
        }

        if !snapshot.has_primary_tier() {
            lines.push(self.yellow("Usage data is incomplete (no gpt-4 tier in response)"));
        }

        lines.push(String::new());
        lines.push(self.format_renewal(&usage.billing_cycle));
        lines.push(format!(
            "Cycle started {}",
            usage.billing_cycle.start_date.format("%B %-d, %Y")
        ));
        lines.push(self.dim(&format!(
            "Last updated {}",
            format_local_time(usage.report.last_updated)
        )));

        lines.join("\n")
    }

    /// Formats one tier line.
    fn format_tier(&self, tier: ModelTier, model: &ModelUsage) -> String {
        let label = format!("{tier}:");

        let mut result = match (model.request_limit(), model.used_percent()) {
            (UsageLimit::Limited(_), Some(used)) => {
                let remaining = (100.0 - used).clamp(0.0, 100.0);
                let bar = self.progress_bar(remaining);
                let left = model.remaining_requests().unwrap_or(0);
                let left_str = self.color_for_percent(remaining, &format!("{left} left"));
                format!("{label:<15} {bar} {} ({left_str})", model.summary())
            }
            (UsageLimit::Unlimited, _) => {
                format!("{label:<15} {} {}", model.summary(), self.dim("unlimited"))
            }
            (UsageLimit::Limited(_), None) => format!("{label:<15} {}", model.summary()),
        };

        if model.num_tokens > 0 {
            result.push_str(&format!(
                "\n{:<15} {}",
                "",
                self.dim(&format!("{} tokens", format_number(model.num_tokens)))
            ));
        }

        result
    }

    /// Formats the renewal line: "Renews in N days (Month D, YYYY)".
    ///
    /// A stale cycle shows its negative day count.
    pub fn format_renewal(&self, cycle: &BillingCycleInfo) -> String {
        let date = cycle.next_renewal.format("%B %-d, %Y");

        match cycle.days_remaining {
            0 => format!("Renews today ({date})"),
            1 => format!("Renews in 1 day ({date})"),
            n if n < 0 => self.red(&format!(
                "Renewal date {date} has passed ({n} days); usage data is out of date"
            )),
            n => format!("Renews in {n} days ({date})"),
        }
    }

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let filled = ((percent_remaining / 100.0) * self.bar_width as f64).round() as usize;
        let filled = filled.min(self.bar_width);
        let empty = self.bar_width - filled;

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    /// Formats the result of the check command.
    pub fn format_check(&self, report: &CheckReport) -> String {
        let mut lines = Vec::new();

        let platform = if report.wsl {
            format!("{} (WSL)", report.platform)
        } else {
            report.platform.clone()
        };
        lines.push(format!("Platform:  {platform}"));

        let exists = if report.database_exists {
            self.green("✓ found")
        } else {
            self.red("✗ not found")
        };
        lines.push(format!(
            "Database:  {} {exists}",
            self.cyan(&report.database_path)
        ));

        match (&report.user_id, &report.error) {
            (Some(user_id), _) => {
                lines.push(format!("Token:     {} (user {user_id})", self.green("✓ found")));
            }
            (None, Some(error)) => {
                lines.push(format!("Token:     {} {}", self.red("✗"), error));
            }
            (None, None) => lines.push(format!("Token:     {}", self.red("✗ not found"))),
        }

        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_number(n: u64) -> String {
    let n = n as f64;
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{n:.0}")
    }
}

fn format_local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
