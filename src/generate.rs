//! The build: fetch records, render the new ones, save the store, write the index.
//!
//! ```text
//! template ──► load store ──► fetch ──► for each record ──► save store ──► index.html
//!                                        │ in store? skip
//!                                        └ slug → page data → render → events/<slug>.html → put
//! ```
//!
//! The run is strictly sequential and linear. Failure handling is coarse:
//!
//! - A template that cannot be read or compiled aborts before anything is fetched.
//! - A fetch failure aborts before the store or index is touched.
//! - A failed page write aborts the run. Pages already written by this run stay
//!   on disk, but the store is not saved, so the next run renders them again.
//! - Missing or malformed record fields never fail; they default (see
//!   [`crate::page`]).
//!
//! The store is threaded through [`process_records`] by value rather than
//! shared, and is saved exactly once per successful run.

use crate::config::Project;
use crate::index;
use crate::page::{self, EventPageData, PageError, PageTemplate};
use crate::records::{FetchError, Record, RecordSource};
use crate::slug::slugify;
use crate::store::{ProcessedEntry, ProcessedSet, StoreError};
use chrono::{DateTime, SubsecRound, Utc};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to write index: {0}")]
    Index(#[source] std::io::Error),
}

/// A page written during this run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub id: String,
    pub slug: String,
    pub title: Option<String>,
    pub path: PathBuf,
}

/// Everything a successful build did.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Records returned by the source.
    pub fetched: usize,
    /// Pages rendered this run, in source order.
    pub generated: Vec<GeneratedPage>,
    /// Records skipped because the store already had them.
    pub skipped: usize,
    pub index_path: PathBuf,
    /// Cards on the index (= store size after this run).
    pub indexed: usize,
}

/// Timestamp source for `processedAt`. Production uses [`system_clock`].
pub type Clock<'a> = &'a dyn Fn() -> DateTime<Utc>;

/// Current UTC time at millisecond precision, matching existing stores.
pub fn system_clock() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Run one full incremental build against `source`.
pub fn run(
    source: &dyn RecordSource,
    project: &Project,
    clock: Clock<'_>,
) -> Result<BuildReport, GenerateError> {
    let template = PageTemplate::load(&project.template_path())?;
    let store = ProcessedSet::load(&project.store_path())?;
    debug!(entries = store.len(), "loaded processed-records store");

    info!(source = %source.describe(), "Fetching records");
    let records = source.fetch_all()?;
    info!("Found {} records", records.len());

    let (store, generated) = process_records(&records, store, &template, project, clock)?;

    store.save(&project.store_path())?;
    info!("Generated {} new pages", generated.len());

    let (index_path, indexed) = index::write_index(&store, project).map_err(GenerateError::Index)?;
    info!(path = %index_path.display(), "Index page generated");

    Ok(BuildReport {
        fetched: records.len(),
        skipped: records.len() - generated.len(),
        generated,
        index_path,
        indexed,
    })
}

/// Render every record whose id is not yet in `store`.
///
/// Takes the store by value and hands it back with the new entries added.
/// Nothing is persisted here.
pub fn process_records(
    records: &[Record],
    mut store: ProcessedSet,
    template: &PageTemplate,
    project: &Project,
    clock: Clock<'_>,
) -> Result<(ProcessedSet, Vec<GeneratedPage>), GenerateError> {
    let events_dir = project.events_dir();
    let default_timezone = &project.config.events.default_timezone;
    let mut generated = Vec::new();

    for record in records {
        if store.contains(&record.id) {
            continue;
        }

        let title = record.title();
        info!("Processing record: {}", title.as_deref().unwrap_or(&record.id));

        let slug = slugify(title.as_deref(), &record.id);
        let data = EventPageData::from_record(record, default_timezone);
        let html = template.render(&data)?;
        let path = page::write_page(&events_dir, &slug, &html)?;

        store.put(
            record.id.clone(),
            ProcessedEntry {
                slug: slug.clone(),
                title: title.clone(),
                processed_at: clock(),
            },
        );
        generated.push(GeneratedPage {
            id: record.id.clone(),
            slug,
            title,
            path,
        });
    }

    Ok((store, generated))
}

/// Rewrite the index from the persisted store without fetching anything.
///
/// Returns the index path and the number of cards.
pub fn rebuild_index(project: &Project) -> Result<(PathBuf, usize), GenerateError> {
    let store = ProcessedSet::load(&project.store_path())?;
    let written = index::write_index(&store, project).map_err(GenerateError::Index)?;
    info!(path = %written.0.display(), "Index page generated");
    Ok(written)
}
