//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout. Progress while a run
//! is in flight goes through `tracing`; these are the end-of-run reports.
//!
//! ## Build
//!
//! ```text
//! Fetched 3 records from Airtable appXYZ/Events
//! 001 Demo Talk → events/demo-talk.html
//! 002 (recQ2) → events/recQ2.html
//! Generated 2 new pages, skipped 1 already processed
//! Index → index.html (5 events)
//! ```
//!
//! ## Index
//!
//! ```text
//! Index → index.html (5 events)
//! ```

use crate::generate::{BuildReport, GeneratedPage};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Path relative to the project root when possible, for compact display.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Titled pages show their title; untitled ones show the record id in parens.
fn page_line(index: usize, page: &GeneratedPage, root: &Path) -> String {
    let label = match &page.title {
        Some(t) if !t.is_empty() => t.clone(),
        _ => format!("({})", page.id),
    };
    format!(
        "{} {} \u{2192} {}",
        format_index(index),
        label,
        display_path(&page.path, root)
    )
}

fn pluralize(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

pub fn format_index_output(index_path: &Path, indexed: usize, root: &Path) -> Vec<String> {
    vec![format!(
        "Index \u{2192} {} ({})",
        display_path(index_path, root),
        pluralize(indexed, "event", "events")
    )]
}

pub fn format_build_output(report: &BuildReport, source: &str, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Fetched {} from {}",
        pluralize(report.fetched, "record", "records"),
        source
    )];

    for (i, page) in report.generated.iter().enumerate() {
        lines.push(page_line(i + 1, page, root));
    }

    lines.push(format!(
        "Generated {}, skipped {} already processed",
        pluralize(report.generated.len(), "new page", "new pages"),
        report.skipped
    ));
    lines.extend(format_index_output(
        &report.index_path,
        report.indexed,
        root,
    ));
    lines
}

pub fn print_build_output(report: &BuildReport, source: &str, root: &Path) {
    for line in format_build_output(report, source, root) {
        println!("{}", line);
    }
}

pub fn print_index_output(index_path: &Path, indexed: usize, root: &Path) {
    for line in format_index_output(index_path, indexed, root) {
        println!("{}", line);
    }
}
