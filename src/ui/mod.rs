//! Terminal output for the harvester binary.
//!
//! Colored status lines, the page progress bar and the preview table printed after a run.

use comfy_table::{Attribute, Cell, Table};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::harvest::HarvestSummary;
use crate::models::BookRecord;

/// Check if stderr is a terminal.
pub fn is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
    }
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => println!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => println!("{} {}", icon.yellow().bold(), msg),
        Status::Info => println!("{} {}", icon.cyan().bold(), msg),
    }
}

/// Progress bar over all page requests.
///
/// Hidden when `quiet` or when stderr is not a terminal; log lines carry progress then.
pub fn page_progress(quiet: bool) -> indicatif::ProgressBar {
    if quiet || !is_terminal() {
        return indicatif::ProgressBar::hidden();
    }

    let pb = indicatif::ProgressBar::new(0);
    match indicatif::ProgressStyle::with_template(
        "{spinner:.cyan} {wide_bar:.cyan/blue} {pos}/{len} pages {msg}",
    ) {
        Ok(style) => pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ").progress_chars("█▉ ")),
        Err(err) => tracing::debug!("Falling back to default progress style: {}", err),
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Truncate to `max_chars` characters, appending `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Table of the first `limit` records.
pub fn preview_table(records: &[BookRecord], limit: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Title", "Authors", "Published", "Rating", "Query"]);

    for record in records.iter().take(limit) {
        let title = record.title.as_deref().unwrap_or("(untitled)");
        let rating = record
            .average_rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(truncate_with_ellipsis(title, 50)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&record.author_list(), 30)),
            Cell::new(record.published_date.as_deref().unwrap_or_default()),
            Cell::new(rating),
            Cell::new(&record.query),
        ]);
    }

    table
}

/// Print the end-of-run report.
pub fn print_summary(summary: &HarvestSummary, preview: usize) {
    println!();
    print_status(
        Status::Info,
        &format!("Total books fetched: {}", summary.fetched.to_string().bold()),
    );
    if summary.duplicates > 0 {
        print_status(
            Status::Info,
            &format!("{} duplicate titles dropped", summary.duplicates),
        );
    }
    if summary.failed_pages > 0 {
        print_status(
            Status::Warning,
            &format!("{} page requests failed and were skipped", summary.failed_pages),
        );
    }
    print_status(
        Status::Success,
        &format!(
            "Books data saved to '{}' ({} unique titles)",
            summary.output_path.display(),
            summary.written
        ),
    );

    if preview > 0 && !summary.records.is_empty() {
        println!("{}", preview_table(&summary.records, preview));
    }
}
