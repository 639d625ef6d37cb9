//! Index page: one card per processed record, newest first.
//!
//! The index is built from the whole processed-set store, not just the
//! current run's records, and is rewritten on every build. It is a single
//! self-contained document with inline CSS. An optional external
//! stylesheet link is controlled by `site.stylesheet`.

use crate::config::{Project, SiteMeta};
use crate::page::en_us_date;
use crate::store::ProcessedSet;
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::{Path, PathBuf};

/// Title shown for records stored without one.
pub const UNTITLED: &str = "Untitled Event";

const INDEX_CSS: &str = r#"
body {
    font-family: Arial, sans-serif;
    max-width: 800px;
    margin: 0 auto;
    padding: 20px;
}
h1 {
    color: #4285F4;
}
.event-list {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(300px, 1fr));
    gap: 20px;
    margin-top: 30px;
}
.event-card {
    border: 1px solid #ddd;
    border-radius: 8px;
    padding: 15px;
    box-shadow: 0 2px 5px rgba(0,0,0,0.1);
}
.event-title {
    margin-top: 0;
    color: #333;
}
.event-link {
    display: inline-block;
    margin-top: 10px;
    padding: 5px 10px;
    background-color: #4285F4;
    color: white;
    text-decoration: none;
    border-radius: 4px;
}
.powered-by {
    margin-top: 50px;
    text-align: center;
}
.powered-by .logo {
    font-size: 24px;
    color: #4285F4;
    margin-right: 5px;
}
"#;

/// One card on the index page.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub title: String,
    pub url: String,
    pub processed_at: DateTime<Utc>,
}

/// Cards for every store entry, sorted by `processed_at` descending.
///
/// Entries with identical stamps keep record-id order.
pub fn index_entries(store: &ProcessedSet, project: &Project) -> Vec<IndexEntry> {
    let mut entries: Vec<IndexEntry> = store
        .entries()
        .map(|(_, entry)| IndexEntry {
            title: entry
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            url: project.event_url(&entry.slug),
            processed_at: entry.processed_at,
        })
        .collect();
    entries.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
    entries
}

pub fn render_index(entries: &[IndexEntry], site: &SiteMeta) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (site.title) }
                @if !site.stylesheet.is_empty() {
                    link rel="stylesheet" href=(site.stylesheet);
                }
                style { (PreEscaped(INDEX_CSS)) }
            }
            body {
                h1 { (site.heading) }
                @if !site.intro.is_empty() {
                    p { (site.intro) }
                }
                div.event-list {
                    @for entry in entries {
                        (render_card(entry))
                    }
                }
                div.powered-by {
                    "Powered by"
                    div.addcal-logo {
                        span.logo { (PreEscaped("&#x1F4C5;")) }
                        (site.brand)
                    }
                }
            }
        }
    }
}

fn render_card(entry: &IndexEntry) -> Markup {
    html! {
        div.event-card {
            h3.event-title { (entry.title) }
            p { "Created: " (en_us_date(entry.processed_at.date_naive())) }
            a.event-link href=(entry.url) { "View Event" }
        }
    }
}

/// Render the index for `store` and write it to the project's index path.
///
/// Returns the written path and the number of cards.
pub fn write_index(store: &ProcessedSet, project: &Project) -> std::io::Result<(PathBuf, usize)> {
    let entries = index_entries(store, project);
    let html = render_index(&entries, &project.config.site).into_string();
    let path = project.index_path();
    ensure_parent(&path)?;
    std::fs::write(&path, html)?;
    Ok((path, entries.len()))
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
