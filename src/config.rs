//! Project configuration.
//!
//! Two sources feed a run:
//!
//! - **`event-pages.toml`** in the project root (optional): output paths, the
//!   default timezone label, index page wording, and Airtable endpoint tuning.
//!   Stock defaults are overridden key by key.
//! - **Environment** (`AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID`,
//!   `AIRTABLE_TABLE_NAME`): credentials and the table to read. These are never
//!   read from the config file so they stay out of version control. A `.env`
//!   file is loaded by the binary before these are looked up.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! template = "template.html"           # Event page template
//! store = "processed-records.json"     # Processed-set store
//! events_dir = "events"                # One <slug>.html per record
//! index = "index.html"                 # Listing of every generated page
//!
//! [events]
//! default_timezone = "PDT / GMT-07:00"
//!
//! [site]
//! title = "Calendar Events"
//! heading = "Calendar Events"
//! intro = "Below are all the events created from Airtable:"
//! brand = "Txtnvite"
//! stylesheet = "style.css"
//!
//! [airtable]
//! api_url = "https://api.airtable.com/v0"
//! page_size = 100
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional config file in the project root.
pub const CONFIG_FILENAME: &str = "event-pages.toml";

pub const ENV_API_KEY: &str = "AIRTABLE_API_KEY";
pub const ENV_BASE_ID: &str = "AIRTABLE_BASE_ID";
pub const ENV_TABLE_NAME: &str = "AIRTABLE_TABLE_NAME";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// Configuration loaded from `event-pages.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where inputs are read from and pages are written to.
    pub paths: PathsConfig,
    /// Defaults applied while shaping event page data.
    pub events: EventsConfig,
    /// Wording of the index page.
    pub site: SiteMeta,
    /// Airtable endpoint settings.
    pub airtable: AirtableConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.airtable.page_size == 0 || self.airtable.page_size > 100 {
            return Err(ConfigError::Validation(
                "airtable.page_size must be 1-100".into(),
            ));
        }
        if self.paths.events_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "paths.events_dir must not be empty".into(),
            ));
        }
        if self.airtable.api_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "airtable.api_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// File locations, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub template: String,
    pub store: String,
    /// Directory for event pages. Index links point here.
    pub events_dir: String,
    pub index: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template: "template.html".to_string(),
            store: "processed-records.json".to_string(),
            events_dir: "events".to_string(),
            index: "index.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    /// Rendered when a record has no `timezone` field.
    pub default_timezone: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            default_timezone: "PDT / GMT-07:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub heading: String,
    pub intro: String,
    /// Name shown in the "Powered by" footer.
    pub brand: String,
    /// Optional external stylesheet linked from the index. Empty disables it.
    pub stylesheet: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Calendar Events".to_string(),
            heading: "Calendar Events".to_string(),
            intro: "Below are all the events created from Airtable:".to_string(),
            brand: "Txtnvite".to_string(),
            stylesheet: "style.css".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirtableConfig {
    pub api_url: String,
    /// Records per list request. Airtable caps this at 100.
    pub page_size: u32,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.airtable.com/v0".to_string(),
            page_size: 100,
        }
    }
}

/// Credentials and table selection, taken from the environment.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`. Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };
        Ok(Self {
            api_key: require(ENV_API_KEY)?,
            base_id: require(ENV_BASE_ID)?,
            table_name: require(ENV_TABLE_NAME)?,
        })
    }
}

/// A project root together with its resolved config.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Project {
    /// Load `event-pages.toml` from `root`, falling back to stock defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            root: root.to_path_buf(),
            config: load_config(root)?,
        })
    }

    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.template)
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.store)
    }

    pub fn events_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.events_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.index)
    }

    /// Link from the index page to an event page, relative to the index's
    /// directory when the events directory sits beneath it.
    pub fn event_url(&self, slug: &str) -> String {
        let index_dir = Path::new(&self.config.paths.index)
            .parent()
            .unwrap_or_else(|| Path::new(""));
        let events_dir = Path::new(&self.config.paths.events_dir);
        let relative = events_dir.strip_prefix(index_dir).unwrap_or(events_dir);
        let mut parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        parts.push(format!("{slug}.html"));
        parts.join("/")
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `event-pages.toml` from `root` as a raw TOML value.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge user values on top of stock defaults, reject unknown keys, validate.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `event-pages.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# event-pages configuration
# =========================
# All settings are optional. Values shown below are the defaults.
# Airtable credentials are NOT read from this file; set AIRTABLE_API_KEY,
# AIRTABLE_BASE_ID and AIRTABLE_TABLE_NAME in the environment or in .env.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# File locations (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
# Event page template. Placeholders use {{ name }}, e.g. {{ title }}.
template = "template.html"
# Record ids that already have a page. Delete an entry to re-render it.
store = "processed-records.json"
# Directory receiving one <slug>.html per event.
events_dir = "events"
# Listing of every generated event page.
index = "index.html"

# ---------------------------------------------------------------------------
# Event page data
# ---------------------------------------------------------------------------
[events]
# Shown when a record has no timezone field.
default_timezone = "PDT / GMT-07:00"

# ---------------------------------------------------------------------------
# Index page
# ---------------------------------------------------------------------------
[site]
title = "Calendar Events"
heading = "Calendar Events"
intro = "Below are all the events created from Airtable:"
# Name shown in the "Powered by" footer.
brand = "Txtnvite"
# External stylesheet linked from the index. Set to "" to omit the link.
stylesheet = "style.css"

# ---------------------------------------------------------------------------
# Airtable
# ---------------------------------------------------------------------------
[airtable]
api_url = "https://api.airtable.com/v0"
# Records per request (1-100).
page_size = 100
"##
}
