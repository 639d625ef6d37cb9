//! Event page rendering.
//!
//! Each new record becomes `events/<slug>.html`. The record's fields are
//! shaped into an [`EventPageData`] according to [`PAGE_FIELDS`]. That data is
//! then rendered through the user's template file.
//!
//! ## Field Defaults
//!
//! | Key | Shape | When absent or unusable |
//! |-----|-------|-------------------------|
//! | `title`, `time`, `location`, `description` | text | `""` |
//! | `date_start`, `date_end` | date → `M/D/YYYY` | `""` |
//! | `timezone` | text | configured default (`PDT / GMT-07:00`) |
//! | `image`, `ogImage` | URL or first attachment URL | `""` |
//! | `google`, `apple`, `outlook` | text (calendar links) | `""` |
//!
//! Shaping never fails. A record with nothing usable still renders, with
//! empty values.
//!
//! ## Template
//!
//! The template is a runtime file using `{{ key }}` placeholders (Tera syntax).
//! Values are HTML-escaped, with `/` left as-is. Use
//! `{{ description | safe }}` to insert a field verbatim. A placeholder naming
//! something outside [`PAGE_FIELDS`] renders as empty text.

use crate::records::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::warn;

const TEMPLATE_NAME: &str = "event.html";

/// Starter template referencing every page field. Printed by `gen-template`.
pub const STOCK_TEMPLATE: &str = include_str!("../assets/template.html");

#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How a source field is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Text,
    /// Timestamp or calendar date, shown as an en-US short date.
    Date,
    /// Plain URL string or Airtable attachment list.
    Url,
}

/// What to render when the shaped value is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Empty,
    DefaultTimezone,
}

/// One row of the field-defaulting table. The record field name and the
/// template key are the same.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: &'static str,
    pub shape: Shape,
    pub fallback: Fallback,
}

const fn rule(key: &'static str, shape: Shape, fallback: Fallback) -> FieldRule {
    FieldRule {
        key,
        shape,
        fallback,
    }
}

/// Every key the page template can reference, with its shaping and default.
pub const PAGE_FIELDS: [FieldRule; 12] = [
    rule("title", Shape::Text, Fallback::Empty),
    rule("date_start", Shape::Date, Fallback::Empty),
    rule("date_end", Shape::Date, Fallback::Empty),
    rule("time", Shape::Text, Fallback::Empty),
    rule("location", Shape::Text, Fallback::Empty),
    rule("description", Shape::Text, Fallback::Empty),
    rule("timezone", Shape::Text, Fallback::DefaultTimezone),
    rule("image", Shape::Url, Fallback::Empty),
    rule("ogImage", Shape::Url, Fallback::Empty),
    rule("google", Shape::Text, Fallback::Empty),
    rule("apple", Shape::Text, Fallback::Empty),
    rule("outlook", Shape::Text, Fallback::Empty),
];

/// View-model for one event page: template key → display text.
///
/// Always holds every key in [`PAGE_FIELDS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventPageData {
    values: BTreeMap<&'static str, String>,
}

impl EventPageData {
    pub fn from_record(record: &Record, default_timezone: &str) -> Self {
        let values = PAGE_FIELDS
            .iter()
            .map(|rule| {
                let shaped = match rule.shape {
                    Shape::Text => record.non_empty_text(rule.key),
                    Shape::Date => record
                        .text(rule.key)
                        .and_then(|raw| format_display_date(&raw)),
                    Shape::Url => record.url(rule.key).filter(|u| !u.is_empty()),
                };
                let value = shaped.unwrap_or_else(|| match rule.fallback {
                    Fallback::Empty => String::new(),
                    Fallback::DefaultTimezone => default_timezone.to_string(),
                });
                (rule.key, value)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Parse a source timestamp and format its (UTC) calendar date as `M/D/YYYY`.
///
/// Accepts RFC 3339 timestamps, zone-less `YYYY-MM-DDTHH:MM[:SS]` (taken as
/// UTC), and plain `YYYY-MM-DD` dates. Returns `None` for anything else.
pub fn format_display_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc).date_naive()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.date()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        dt.date()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?
    };
    Some(en_us_date(date))
}

/// `2024-05-01` → `5/1/2024`.
pub fn en_us_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// The compiled event page template.
pub struct PageTemplate {
    tera: Tera,
    /// Names the template references that are not page fields. Bound to `""`
    /// at render time.
    unknown: Vec<String>,
}

impl PageTemplate {
    /// Compile template text. Syntax errors are reported here, before any
    /// record is rendered.
    pub fn from_source(source: &str) -> Result<Self, PageError> {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_html);
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self {
            tera,
            unknown: unknown_placeholders(source),
        })
    }

    /// Read and compile the template file. Logs a warning for every page
    /// field the template never references, and for every placeholder that
    /// is not a page field.
    pub fn load(path: &Path) -> Result<Self, PageError> {
        let source = std::fs::read_to_string(path).map_err(|source| PageError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        let template = Self::from_source(&source)?;
        for key in missing_placeholders(&source) {
            warn!(template = %path.display(), key, "template never uses page field");
        }
        for name in &template.unknown {
            warn!(template = %path.display(), name, "unknown placeholder renders empty");
        }
        Ok(template)
    }

    pub fn render(&self, data: &EventPageData) -> Result<String, PageError> {
        let mut context = Context::from_serialize(data)?;
        for name in &self.unknown {
            context.insert(name.as_str(), "");
        }
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// HTML-escape a placeholder value the way maud escapes text. Unlike Tera's
/// default this leaves `/` alone, so dates and URLs stay readable.
fn escape_html(input: &str) -> String {
    maud::html! { (input) }.into_string()
}

/// Every identifier-like word inside the `{{ ... }}` expressions of `source`.
///
/// Filter names and arguments are included; callers only compare the result
/// against known keys.
fn placeholder_names(source: &str) -> BTreeSet<&str> {
    let mut names = BTreeSet::new();
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else { break };
        names.extend(
            after[..end]
                .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .filter(|word| word.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')),
        );
        rest = &after[end + 2..];
    }
    names
}

fn is_page_field(name: &str) -> bool {
    PAGE_FIELDS.iter().any(|rule| rule.key == name)
}

/// Page fields not referenced by any `{{ ... }}` expression in `source`.
pub fn missing_placeholders(source: &str) -> Vec<&'static str> {
    let used = placeholder_names(source);
    PAGE_FIELDS
        .iter()
        .map(|rule| rule.key)
        .filter(|key| !used.contains(key))
        .collect()
}

/// Names used in `{{ ... }}` expressions that are not page fields.
///
/// Tera's own words (`safe`, `true`, ...) show up here too and are harmless
/// to bind.
pub fn unknown_placeholders(source: &str) -> Vec<String> {
    placeholder_names(source)
        .into_iter()
        .filter(|name| !is_page_field(name))
        .map(str::to_string)
        .collect()
}

/// Write rendered HTML to `<events_dir>/<slug>.html`, creating the directory
/// if needed.
pub fn write_page(events_dir: &Path, slug: &str, html: &str) -> Result<PathBuf, PageError> {
    std::fs::create_dir_all(events_dir).map_err(|source| PageError::Write {
        path: events_dir.to_path_buf(),
        source,
    })?;
    let path = events_dir.join(format!("{slug}.html"));
    std::fs::write(&path, html).map_err(|source| PageError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
