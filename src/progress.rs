//! Progress reporting for the category walker
//!
//! Provides real-time progress display using indicatif progress bars.
//! Everything here draws on stderr; stdout is reserved for the JSON output.

use crate::walker::EnrichProgress;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays enrichment status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &EnrichProgress) {
        self.bar.set_message(progress_message(progress));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line status for the spinner
fn progress_message(progress: &EnrichProgress) -> String {
    let mut msg = format!(
        "Categories: {}/{} ({:.0}%) | Products: {} | Rate: {:.1}/s | Queue: {} | Workers: {}",
        format_number(progress.categories),
        format_number(progress.total_categories),
        progress.fraction_done() * 100.0,
        format_number(progress.products),
        progress.categories_per_second(),
        format_number(progress.queued),
        progress.total_workers,
    );

    if progress.failures > 0 {
        msg.push_str(&format!(" | {}", style(format!("Failed: {}", progress.failures)).red()));
    }

    msg
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the run
pub fn print_summary(categories: u64, products: u64, duration: Duration, output: &str) {
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        categories as f64 / duration_secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("{}", style("Enrichment Complete").green().bold());
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Categories:").bold(), format_number(categories));
    eprintln!("  {} {}", style("Products:").bold(), format_number(products));
    eprintln!(
        "  {} {:.1}s ({:.1} categories/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    eprintln!("  {} {}", style("Output:").bold(), output);
    eprintln!();
}

/// Print a header at the start of the run
pub fn print_header(source: &str, workers: usize, origin: &str, top_n: usize) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("catalog-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Source:").bold(), source);
    eprintln!("  {} {}", style("Workers:").bold(), workers);
    eprintln!("  {} {}", style("Origin:").bold(), origin);
    eprintln!("  {} {}", style("Top products:").bold(), top_n);
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_message() {
        let mut progress = EnrichProgress {
            categories: 1500,
            total_categories: 3000,
            products: 42_000,
            failures: 0,
            queued: 64,
            total_workers: 6,
            elapsed: Duration::from_secs(10),
        };

        let msg = progress_message(&progress);
        assert!(msg.contains("Categories: 1,500/3,000 (50%)"));
        assert!(msg.contains("Queue: 64"));
        assert!(msg.contains("Rate: 150.0/s"));
        assert!(!msg.contains("Failed"));

        progress.failures = 1;
        assert!(progress_message(&progress).contains("Failed: 1"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
