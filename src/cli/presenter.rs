//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::StatusSink;
use crate::domain::recording::{CaptureState, StatusLabel, StatusReport};

/// Presenter for CLI output formatting
pub struct Presenter;

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self
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

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line summary of a status report for the spinner
pub fn format_status_line(report: &StatusReport) -> String {
    let secs = report.elapsed.as_secs();
    let dot = match report.state {
        CaptureState::Recording => "●".red(),
        CaptureState::Paused => "‖".yellow(),
        CaptureState::Finalizing => "◌".cyan(),
        CaptureState::Idle => "○".normal(),
    };

    format!(
        "{} {} {:02}:{:02}:{:02} | {}MB | {} segment(s), {}MB kept",
        dot,
        report.label.as_str(),
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        report.megabytes(),
        report.segments,
        report.stored_megabytes()
    )
}

/// Status sink drawing a spinner line on stderr.
///
/// Notes are printed above the spinner; a settled session prints where the
/// recording was saved.
pub struct TerminalStatusSink {
    spinner: ProgressBar,
}

impl TerminalStatusSink {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner }
    }

    /// Remove the spinner line
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for TerminalStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for TerminalStatusSink {
    fn publish(&self, report: &StatusReport) {
        if report.label == StatusLabel::Finalized && report.saved_to.is_some() {
            self.spinner.println(format!("{} {}", "✓".green(), report));
        } else if let Some(ref note) = report.note {
            self.spinner.println(format!("{} {}", "⚠".yellow(), note));
        }
        self.spinner.set_message(format_status_line(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(secs: u64, bytes: u64) -> StatusReport {
        StatusReport {
            label: StatusLabel::Started,
            state: CaptureState::Recording,
            elapsed: Duration::from_secs(secs),
            bytes_recorded: bytes,
            segments: 2,
            stored_bytes: 12 * 1024 * 1024,
            saved_to: None,
            note: None,
        }
    }

    #[test]
    fn status_line_shows_clock_and_size() {
        colored::control::set_override(false);
        let line = format_status_line(&report(3725, 5 * 1024 * 1024));
        assert!(line.contains("01:02:05"));
        assert!(line.contains("5MB"));
        assert!(line.contains("2 segment(s), 12MB kept"));
    }

    #[test]
    fn sink_accepts_settled_report() {
        let sink = TerminalStatusSink::new();
        let mut settled = report(10, 0);
        settled.label = StatusLabel::Finalized;
        settled.saved_to = Some(PathBuf::from("/tmp/cctv"));
        sink.publish(&settled.with_note("volume full"));
        sink.finish();
    }
}
