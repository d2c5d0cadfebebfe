//! Console presentation of worker events.
//!
//! [`ConsoleSink`] is the CLI's implementation of [`EventSink`]: timestamped
//! log lines, colored status and completion messages, and an indicatif
//! progress bar during transfers. The summary table at the end of a scan
//! lives here too, so formatting stays in one place.

use crate::events::EventSink;
use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Prints worker events to the terminal.
///
/// The progress bar is created lazily on the first progress event and
/// finished when the operation completes or is cancelled. While a bar is
/// active, lines are routed through it so they do not tear the display.
pub struct ConsoleSink {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn emit(&self, line: String) {
        let Ok(bar) = self.bar.lock() else {
            return;
        };
        match bar.as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }

    fn finish_bar(&self) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = bar.take() {
            bar.finish_and_clear();
        }
    }

    fn percent_bar() -> ProgressBar {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}% {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        bar
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleSink {
    fn log(&self, message: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.emit(format!("{} {}", format!("[{}]", stamp).dimmed(), message));
    }

    fn status(&self, text: &str) {
        self.emit(text.cyan().to_string());
    }

    fn progress(&self, percent: u8) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        bar.get_or_insert_with(Self::percent_bar)
            .set_position(u64::from(percent.min(100)));
    }

    fn file_found(&self, name: &str, extension: &str, size: &str, path: &Path) {
        self.emit(format!(
            " - {}{} ({}) {}",
            name,
            extension,
            size,
            path.display().to_string().dimmed()
        ));
    }

    fn scan_complete(&self, count: usize) {
        self.emit(format!(
            "{} Scan complete: {} {} matched",
            "✓".green(),
            count,
            if count == 1 { "file" } else { "files" }
        ));
    }

    fn transfer_complete(&self, transferred: usize, failed: usize) {
        self.finish_bar();
        if failed == 0 {
            self.emit(format!(
                "{} Transfer complete: {} transferred",
                "✓".green(),
                transferred
            ));
        } else {
            self.emit(format!(
                "{} Transfer complete: {} transferred, {} failed",
                "⚠".yellow(),
                transferred,
                failed
            ));
        }
    }

    fn transfer_cancelled(&self) {
        self.finish_bar();
        self.emit(format!("{} Transfer cancelled", "⚠".yellow()));
    }
}

/// Prints a per-category summary of a scan.
pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
    println!("\n{}", "SUMMARY".bold());

    let mut categories: Vec<_> = category_counts.iter().collect();
    categories.sort_by_key(|&(name, _)| name);

    let width = categories
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0)
        .max(8);

    println!("{:<width$} | {}", "Category".bold(), "Files".bold());
    println!("{}", "-".repeat(width + 10));

    for (category, count) in &categories {
        let file_word = if **count == 1 { "file" } else { "files" };
        println!(
            "{:<width$} | {} {}",
            category,
            count.to_string().green(),
            file_word
        );
    }

    println!("{}", "-".repeat(width + 10));
    println!(
        "{:<width$} | {} {}",
        "Total".bold(),
        total_files.to_string().green().bold(),
        if total_files == 1 { "file" } else { "files" }
    );
}
