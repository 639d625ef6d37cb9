//! Shared test utilities.
//!
//! Record builders, a deterministic clock, and a throwaway project directory
//! seeded with the stock template.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tp = TestProject::new();
//! let clock = FixedClock::starting("2024-05-01T12:00:00Z");
//! let records = vec![record("rec1", json!({"title": "Demo Talk"}))];
//! generate::run(&records, &tp.project, &|| clock.tick()).unwrap();
//! assert!(tp.exists("events/demo-talk.html"));
//! ```

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::cell::Cell;
use tempfile::TempDir;

use crate::config::{Project, SiteConfig};
use crate::page::STOCK_TEMPLATE;
use crate::records::Record;
use crate::store::ProcessedSet;

/// Build a record from a JSON object of fields. Panics on non-objects.
pub fn record(id: &str, fields: Value) -> Record {
    let Value::Object(fields) = fields else {
        panic!("record fields must be a JSON object")
    };
    Record {
        id: id.to_string(),
        fields,
        created_time: None,
    }
}

/// Parse an RFC 3339 timestamp. Panics on bad input.
pub fn at(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts)
        .unwrap_or_else(|e| panic!("bad timestamp {ts}: {e}"))
        .with_timezone(&Utc)
}

/// Clock that advances one second per reading.
pub struct FixedClock {
    next: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn starting(ts: &str) -> Self {
        Self {
            next: Cell::new(at(ts)),
        }
    }

    pub fn tick(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + Duration::seconds(1));
        now
    }
}

/// Temp project root with `template.html` and default config.
pub struct TestProject {
    pub project: Project,
    // Held so the directory lives as long as the project.
    _dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("template.html"), STOCK_TEMPLATE).unwrap();
        Self {
            project: Project::new(dir.path(), SiteConfig::default()),
            _dir: dir,
        }
    }

    /// Read a file relative to the project root. Panics if missing.
    pub fn read(&self, rel: &str) -> String {
        let path = self.project.root.join(rel);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.project.root.join(rel).exists()
    }

    pub fn store(&self) -> ProcessedSet {
        ProcessedSet::load(&self.project.store_path()).unwrap()
    }
}
