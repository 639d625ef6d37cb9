//! # event-pages
//!
//! Turns rows of an Airtable events table into static HTML pages, plus an
//! `index.html` linking every page generated so far. Meant to run on a
//! schedule (CI cron) with the output committed back to a static host.
//!
//! # Incremental Builds
//!
//! Each run fetches the whole table, but only records it has never seen are
//! rendered:
//!
//! ```text
//! Airtable ──► records ──► new? ──► events/<slug>.html
//!                            │
//!        processed-records.json (id → slug, title, processedAt)
//!                            │
//!                            └──► index.html (all entries, newest first)
//! ```
//!
//! The processed-records store is the only durable state. Once a record id
//! is in it, that record is never rendered again, even if it is edited
//! upstream. Delete its entry from the store to force a re-render.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`records`] | `Record` type, the `RecordSource` trait, JSON dumps on disk |
//! | [`airtable`] | Paginated Airtable list-records client |
//! | [`store`] | Processed-set store: load once, put, save once |
//! | [`slug`] | Title → filename stem |
//! | [`page`] | Field defaulting table, event page template, page writes |
//! | [`index`] | Index page built with Maud from the whole store |
//! | [`generate`] | The build pipeline tying the above together |
//! | [`config`] | `event-pages.toml` + environment credentials |
//! | [`output`] | End-of-run CLI reports |
//!
//! # Templates
//!
//! Event pages come from a user-editable `template.html` compiled at runtime
//! with Tera, because the page design lives with the published site rather
//! than in this binary. The index page has a fixed layout and is built with
//! Maud.

pub mod airtable;
pub mod config;
pub mod generate;
pub mod index;
pub mod output;
pub mod page;
pub mod records;
pub mod slug;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
