//! Pretty-mode display logic for the spinarak CLI.
//!
//! This module handles all `--pretty` output: colored result lines, progress
//! counters, the spinner shown while a JSON batch is collected, headers and
//! summaries. Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use spinarak_lib::{PageResult, SpinarakError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::ErrorStats;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner with the given message, or `None` if stderr isn't a TTY.
    pub fn start(message: String) -> Option<Self> {
        let term = Term::stderr();
        if !term.is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header(word: &str, link_count: usize, workers: usize) {
    println!(
        "{} {} {}",
        style("spinarak").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Counting '{}' on {} page{}",
            word,
            link_count,
            if link_count == 1 { "" } else { "s" }
        ))
        .dim(),
    );
    println!("{}", style(format!("Workers: {}", workers)).dim());
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Print a single page result with colors and alignment.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is shown.
pub fn print_result(result: &PageResult, debug: bool, counter: Option<(usize, usize)>) {
    let link_width = 50;
    let padded_link = pad_str(&result.link, link_width, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };

    match &result.error {
        None => {
            let count = style(format!("{:>6}", result.count));
            let count = if result.count > 0 {
                count.green().bold()
            } else {
                count.white()
            };
            println!("  {}{}  {}", prefix, style(&padded_link).white(), count);
        }
        Some(err) => {
            let marker = if err.is_scan_error() {
                style(format!("{:>6}", result.count)).yellow()
            } else {
                style(format!("{:>6}", "-")).red()
            };
            println!(
                "  {}{}  {}  {}",
                prefix,
                style(&padded_link).white(),
                marker,
                style(brief_error(err)).dim(),
            );
            if debug {
                println!("    {} {}", style("└─").dim(), style(err).dim());
            }
        }
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(pages: usize, matches: u64, errors: usize, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} page{} in {:.1}s  {}  {}  {}  {}",
        style(pages).bold(),
        if pages == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} match{}", matches, if matches == 1 { "" } else { "es" })).green(),
        style("|").dim(),
        style(format!("{} error{}", errors, if errors == 1 { "" } else { "s" })).red(),
    );
}

// ── Error summary ────────────────────────────────────────────────────────────

/// Print a categorized error summary using colors.
pub fn print_error_summary(error_stats: &ErrorStats) {
    if !error_stats.has_errors() {
        return;
    }

    println!("  {}", style("Some pages could not be counted:").yellow());

    for (label, links) in error_stats.categories() {
        if links.is_empty() {
            continue;
        }
        println!(
            "  {} {} {}{}: {}",
            style("•").dim(),
            links.len(),
            label,
            if links.len() == 1 { "" } else { "s" },
            format_link_list(links, 5),
        );
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Join links, showing at most `max_show` and a count of the rest.
pub fn format_link_list(links: &[String], max_show: usize) -> String {
    if links.len() <= max_show {
        links.join(", ")
    } else {
        let shown = &links[..max_show];
        let remaining = links.len() - max_show;
        format!("{}, ... and {} more", shown.join(", "), remaining)
    }
}

/// A brief reason for a failed page.
fn brief_error(err: &SpinarakError) -> String {
    match err {
        SpinarakError::FetchError { .. } => "(fetch failed)".to_string(),
        SpinarakError::UnexpectedStatus { status, .. } => format!("(HTTP {})", status),
        SpinarakError::ScanError { .. } => "(partial, read failed)".to_string(),
        _ => "(error)".to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief_error_status() {
        let err = SpinarakError::unexpected_status("http://a", 404);
        assert_eq!(brief_error(&err), "(HTTP 404)");
    }

    #[test]
    fn test_brief_error_fetch() {
        let err = SpinarakError::fetch("http://a", "connection refused");
        assert_eq!(brief_error(&err), "(fetch failed)");
    }

    #[test]
    fn test_brief_error_scan() {
        let err = SpinarakError::scan("http://a", "reset");
        assert_eq!(brief_error(&err), "(partial, read failed)");
    }

    #[test]
    fn test_format_link_list_truncates() {
        let links: Vec<String> = (0..8).map(|i| format!("http://{}", i)).collect();
        let formatted = format_link_list(&links, 5);
        assert!(formatted.starts_with("http://0, http://1"));
        assert!(formatted.ends_with("... and 3 more"));
    }

    #[test]
    fn test_format_link_list_short() {
        let links = vec!["http://a".to_string(), "http://b".to_string()];
        assert_eq!(format_link_list(&links, 5), "http://a, http://b");
    }
}
