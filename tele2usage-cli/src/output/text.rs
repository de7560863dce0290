//! Text output formatting with progress bars and colors.

use chrono::NaiveDate;
use std::time::Duration;
use tele2usage_core::{DataLimit, FieldValue, UsageSnapshot, UsageSource};
use tele2usage_store::{AccountConfig, PollStatus, Sensor};

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

/// Megabytes per gigabyte (decimal units).
const MB_PER_GB: f64 = 1000.0;

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

    /// Formats the usage summary of one account.
    pub fn format_account(&self, config: &AccountConfig, snapshot: &UsageSnapshot) -> String {
        let mut lines = vec![format!(
            "{} ({}, {})",
            self.bold(&config.name),
            config.subscription_model,
            config.subscription_id
        )];

        if !snapshot.has_data() {
            lines.push(self.dim("No usage data yet"));
        } else if snapshot.is_unlimited || snapshot.data_limit == Some(DataLimit::Unlimited) {
            let used = snapshot.data_used_mb.map(format_data).unwrap_or_default();
            lines.push(format!("{:<8} {} ({used} used)", "Data:", self.cyan("Unlimited")));
        } else if let Some(percent_used) = snapshot.used_percent() {
            let remaining = 100.0 - percent_used;
            let pct_str = self.color_for_percent(remaining, &format!("{remaining:.0}% left"));
            let mut line = format!("{:<8} {} {pct_str}", "Left:", self.progress_bar(remaining));
            if let (Some(left), Some(limit)) = (
                snapshot.data_left_mb,
                snapshot.data_limit.and_then(|l| l.megabytes()),
            ) {
                line.push_str(&format!("  {} of {}", format_data(left), format_data(limit)));
            }
            lines.push(line);
        }

        if let (Some(start), Some(end)) = (snapshot.period_start, snapshot.period_end) {
            lines.push(format!("{:<8} {start} to {end}", "Period:"));
        }

        if let Some(kind) = snapshot.error {
            lines.push(self.red(&format!("Last update failed: {kind}")));
        }

        lines.join("\n")
    }

    /// Formats one sensor as `name  value`.
    pub fn format_sensor<S: UsageSource>(&self, sensor: &Sensor<S>) -> String {
        format!("  {:<26} {}", sensor.name(), self.format_value(sensor.value()))
    }

    /// Formats a sensor value; data sizes use the suggested unit.
    pub fn format_value(&self, value: Option<FieldValue>) -> String {
        match value {
            None => self.dim("unknown"),
            Some(FieldValue::Megabytes(mb)) => format_data(mb),
            Some(FieldValue::Date(date)) if date == NaiveDate::MIN => self.dim("unknown"),
            Some(other) => other.to_string(),
        }
    }

    /// Formats the poll cadence of an account.
    pub fn format_poll_status(&self, status: &PollStatus) -> String {
        let every = format_duration(status.effective_interval);
        if status.trend_decreasing {
            self.dim(&format!("Polling every {every} (data left falling)"))
        } else {
            self.dim(&format!("Polling every {every}"))
        }
    }

    /// Header of the account list.
    pub fn format_accounts_header(&self) -> String {
        self.bold(&format!(
            "{:<20} {:<16} {:<20} {}",
            "NAME", "SUBSCRIPTION", "MODEL", "INTERVAL"
        ))
    }

    /// One line of the account list.
    pub fn format_account_line(&self, config: &AccountConfig) -> String {
        format!(
            "{:<20} {:<16} {:<20} {}",
            config.name,
            config.subscription_id,
            config.subscription_model,
            format_duration(config.poll_interval())
        )
    }

    /// Formats a progress bar.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let filled = ((percent_remaining.clamp(0.0, 100.0) / 100.0) * self.bar_width as f64)
            .round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    /// Formats a success message.
    pub fn format_success(&self, message: &str) -> String {
        if self.use_colors {
            format!("{GREEN}✓{RESET} {message}")
        } else {
            format!("✓ {message}")
        }
    }

    // ========================================================================
    // Helpers
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

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
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

/// Formats megabytes, switching to gigabytes from 1000 MB.
pub fn format_data(mb: f64) -> String {
    if mb.abs() >= MB_PER_GB {
        format!("{:.1} GB", mb / MB_PER_GB)
    } else {
        format!("{mb:.0} MB")
    }
}

/// Formats a duration as `1h 30m`, `7m 30s`, or `45s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m, s) {
        (0, 0, s) => format!("{s}s"),
        (0, m, 0) => format!("{m}m"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, 0, _) => format!("{h}h"),
        (h, m, _) => format!("{h}h {m}m"),
    }
}
