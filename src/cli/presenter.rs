//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::{PassOutcome, SkipReason};
use crate::domain::sync::{SyncRecord, SyncStatus};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Handle for updating the spinner from another task
    pub fn spinner_handle(&self) -> Option<ProgressBar> {
        self.spinner.clone()
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print daemon status
    pub fn daemon_status(&self, state: &str) {
        eprintln!("{} Daemon: {}", "●".cyan(), state);
    }

    /// Print a key-value pair
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Status text colored by state
    pub fn colored_status(status: SyncStatus) -> ColoredString {
        let text = status.display_text();
        match status {
            SyncStatus::Synced => text.green(),
            SyncStatus::Failed => text.red(),
            SyncStatus::Syncing => text.cyan(),
            SyncStatus::NotSynced | SyncStatus::Pending => text.yellow(),
        }
    }

    /// One table row: id, status, attempts, last attempt, last error
    pub fn format_record(record: &SyncRecord, max_retries: u32) -> String {
        let mut row = format!(
            "{:<32} {:<12} {}/{}",
            record.artifact_id().as_str(),
            Self::colored_status(record.status()),
            record.attempt_count(),
            max_retries
        );
        if let Some(at) = record.last_attempt_at() {
            row.push_str(&format!("  {}", at.format("%Y-%m-%d %H:%M:%S")));
        }
        if let Some(error) = record.last_error() {
            row.push_str(&format!("  {}", error.red()));
        }
        row
    }

    /// Print records as a table on stdout
    pub fn records(&self, records: &[SyncRecord], max_retries: u32) {
        if records.is_empty() {
            self.output("No recordings tracked");
            return;
        }
        for record in records {
            self.output(&Self::format_record(record, max_retries));
        }
    }

    /// Human summary of a pass
    pub fn format_pass(outcome: &PassOutcome) -> String {
        match outcome {
            PassOutcome::Skipped(SkipReason::AlreadyRunning) => {
                "Sync already in progress".to_string()
            }
            PassOutcome::Skipped(SkipReason::NotPreferredNetwork) => {
                "Not on preferred network, sync skipped".to_string()
            }
            PassOutcome::Completed(report) if report.eligible == 0 => {
                "Nothing to sync".to_string()
            }
            PassOutcome::Completed(report) => format!(
                "Synced {} of {} ({} failed)",
                report.synced, report.attempted, report.failed
            ),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
