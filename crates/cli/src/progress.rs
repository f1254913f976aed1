//! Progress indicators

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pindrop_core::AdOverlayState;

/// A single network step backed by an indicatif spinner.
///
/// Finish with [`Step::finish`] or [`Step::fail`]. On a non-TTY the spinner
/// draws nothing but the closing line is still printed.
pub struct Step {
    pb: ProgressBar,
    label: String,
}

impl Step {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("{}...", label));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { pb, label }
    }

    /// Prints `"  label... done: {summary}"`.
    pub fn finish(&self, summary: &str) {
        self.pb.finish_and_clear();
        if summary.is_empty() {
            eprintln!("  {}... {}", self.label, "done".green());
        } else {
            eprintln!("  {}... {}: {}", self.label, "done".green(), summary);
        }
    }

    pub fn fail(&self, msg: impl std::fmt::Display) {
        self.pb.finish_and_clear();
        eprintln!("  {}... {}", self.label, "failed".red());
        eprintln!("  {}", msg);
    }
}

/// Countdown bar for the ad overlay. Position is elapsed seconds.
pub struct AdBar {
    pb: ProgressBar,
    total: u32,
}

impl AdBar {
    pub fn new(total_seconds: u32) -> Self {
        let pb = ProgressBar::new(u64::from(total_seconds));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix} [{bar:30.yellow/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_prefix("Ad".bold().to_string());
        Self {
            pb,
            total: total_seconds,
        }
    }

    pub fn update(&self, state: &AdOverlayState, skip_in: u32) {
        self.pb
            .set_position(u64::from(self.total.saturating_sub(state.remaining_seconds)));
        let hint = if state.skippable {
            "press Enter to skip".green().to_string()
        } else {
            format!("skip in {}s", skip_in).dimmed().to_string()
        };
        self.pb
            .set_message(format!("{}s left  {}", state.remaining_seconds, hint));
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
