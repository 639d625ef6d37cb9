//! Event records as returned by the data source.
//!
//! A [`Record`] is one Airtable row: an id plus a loosely-typed field map.
//! Nothing about the fields is guaranteed; consumers read them through the
//! accessors here and default whatever is missing.
//!
//! Records reach the pipeline through the [`RecordSource`] trait. The live
//! implementation is [`crate::airtable::AirtableClient`]; [`RecordFile`] reads
//! a JSON dump of the same shape from disk.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Airtable returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid Airtable URL: {0}")]
    Url(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<String>,
}

impl Record {
    /// Field value as display text.
    ///
    /// Strings are returned as-is, numbers and booleans in their display
    /// form. Lists of strings are joined with `", "`. Anything else (absent,
    /// null, objects, attachment lists) yields `None`.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(items) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                (!parts.is_empty() && parts.len() == items.len()).then(|| parts.join(", "))
            }
            _ => None,
        }
    }

    /// Field value as text, with empty strings treated as absent.
    pub fn non_empty_text(&self, name: &str) -> Option<String> {
        self.text(name).filter(|s| !s.is_empty())
    }

    /// URL held by a field: a plain string, or the first entry of an
    /// Airtable attachment list (`[{"url": ...}, ...]`).
    pub fn url(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.first().and_then(|first| match first {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
                _ => None,
            }),
            _ => None,
        }
    }

    /// The record title, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        self.non_empty_text("title")
    }
}

/// Anything that can list every current record of the configured table.
pub trait RecordSource {
    /// Human-readable origin, used in log lines.
    fn describe(&self) -> String;

    /// Return all records in source order. No retries.
    fn fetch_all(&self) -> Result<Vec<Record>, FetchError>;
}

impl RecordSource for Vec<Record> {
    fn describe(&self) -> String {
        "in-memory records".to_string()
    }

    fn fetch_all(&self) -> Result<Vec<Record>, FetchError> {
        Ok(self.clone())
    }
}

/// Records read from a JSON file shaped like an Airtable list response
/// (`{"records": [...]}`) or a bare array of records.
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDump {
    Listing { records: Vec<Record> },
    Bare(Vec<Record>),
}

/// Parse a record dump (either shape accepted by [`RecordFile`]).
pub fn parse_records(json: &str) -> Result<Vec<Record>, FetchError> {
    Ok(match serde_json::from_str(json)? {
        RecordDump::Listing { records } => records,
        RecordDump::Bare(records) => records,
    })
}

impl RecordSource for RecordFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_all(&self) -> Result<Vec<Record>, FetchError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_records(&content)
    }
}
