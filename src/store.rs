//! Processed-set store: which records already have a page.
//!
//! The store is a JSON object keyed by record id:
//!
//! ```json
//! {
//!   "rec1": { "slug": "demo-talk", "title": "Demo Talk", "processedAt": "2024-05-01T10:00:00.000Z" }
//! }
//! ```
//!
//! It is loaded whole at the start of a run, mutated in memory, and written
//! back whole exactly once at the end. A run that fails before the save
//! leaves the file untouched, so the next run re-renders everything the
//! failed run had rendered. There is no delete operation: once an id is in
//! the store, that record is never rendered again.
//!
//! Concurrent runs are not coordinated; the last save wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed processed-records store {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// What the store remembers about a rendered record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntry {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub processed_at: DateTime<Utc>,
}

/// In-memory processed set, ordered by record id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessedSet {
    entries: BTreeMap<String, ProcessedEntry>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is the first-run case and yields an
    /// empty set; an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the full set to `path`, replacing prior contents.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or overwrite the entry for `id`.
    pub fn put(&mut self, id: impl Into<String>, entry: ProcessedEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&ProcessedEntry> {
        self.entries.get(id)
    }

    /// Entries in record-id order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ProcessedEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::at;
    use tempfile::TempDir;

    fn entry(slug: &str, title: Option<&str>, ts: &str) -> ProcessedEntry {
        ProcessedEntry {
            slug: slug.to_string(),
            title: title.map(str::to_string),
            processed_at: at(ts),
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let set = ProcessedSet::load(&tmp.path().join("processed-records.json")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn load_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed-records.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ProcessedSet::load(&path),
            Err(StoreError::Json { .. })
        ));
    }

    #[test]
    fn put_then_contains() {
        let mut set = ProcessedSet::new();
        assert!(!set.contains("rec1"));
        set.put("rec1", entry("demo-talk", Some("Demo Talk"), "2024-05-01T10:00:00Z"));
        assert!(set.contains("rec1"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn put_overwrites_existing_id() {
        let mut set = ProcessedSet::new();
        set.put("rec1", entry("a", None, "2024-05-01T10:00:00Z"));
        set.put("rec1", entry("b", None, "2024-05-02T10:00:00Z"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("rec1").unwrap().slug, "b");
    }

    #[test]
    fn save_and_reload_keeps_every_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed-records.json");

        let mut set = ProcessedSet::new();
        set.put("rec1", entry("demo-talk", Some("Demo Talk"), "2024-05-01T10:00:00Z"));
        set.save(&path).unwrap();

        let mut reloaded = ProcessedSet::load(&path).unwrap();
        reloaded.put("rec2", entry("rec2", None, "2024-05-02T10:00:00Z"));
        reloaded.save(&path).unwrap();

        let last = ProcessedSet::load(&path).unwrap();
        assert!(last.contains("rec1"));
        assert!(last.contains("rec2"));
        assert_eq!(last.get("rec1"), set.get("rec1"));
    }

    #[test]
    fn reads_store_written_with_millisecond_stamps() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed-records.json");
        std::fs::write(
            &path,
            r#"{"recA":{"slug":"spring-gala","title":"Spring Gala","processedAt":"2025-03-01T08:30:00.123Z"},
                "recB":{"slug":"recB","processedAt":"2025-03-02T08:30:00.000Z"}}"#,
        )
        .unwrap();

        let set = ProcessedSet::load(&path).unwrap();
        assert_eq!(set.get("recA").unwrap().title.as_deref(), Some("Spring Gala"));
        assert_eq!(set.get("recB").unwrap().title, None);
        assert_eq!(
            set.get("recB").unwrap().processed_at,
            at("2025-03-02T08:30:00Z")
        );
    }

    #[test]
    fn serializes_camel_case_keys() {
        let mut set = ProcessedSet::new();
        set.put("rec1", entry("demo-talk", None, "2024-05-01T10:00:00Z"));
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"processedAt\""));
        assert!(!json.contains("\"title\""));
    }
}
