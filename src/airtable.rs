//! Airtable REST client.
//!
//! Lists every record of one table:
//!
//! ```text
//! GET {api_url}/{base_id}/{table}?pageSize=100[&offset=...]
//! Authorization: Bearer <api key>
//! ```
//!
//! Airtable returns at most `pageSize` records per response together with an
//! `offset` cursor while more remain. The client follows the cursor until it
//! is absent and returns the concatenated records in response order.
//! Failures propagate immediately; there is no retry and no timeout.

use crate::config::{AirtableConfig, Credentials};
use crate::records::{FetchError, Record, RecordSource};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

/// One page of a list-records response.
#[derive(Debug, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub offset: Option<String>,
}

pub struct AirtableClient {
    http: Client,
    api_url: String,
    page_size: u32,
    credentials: Credentials,
}

impl AirtableClient {
    pub fn new(credentials: Credentials, config: &AirtableConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("event-pages/", env!("CARGO_PKG_VERSION")))
            .timeout(None)
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            page_size: config.page_size,
            credentials,
        })
    }

    /// URL for one list request. The table name is percent-encoded as a
    /// path segment, so names with spaces work.
    pub fn list_url(&self, offset: Option<&str>) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| FetchError::Url(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Url(format!("{} cannot be a base URL", self.api_url)))?
            .pop_if_empty()
            .push(&self.credentials.base_id)
            .push(&self.credentials.table_name);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &self.page_size.to_string());
            if let Some(offset) = offset {
                query.append_pair("offset", offset);
            }
        }
        Ok(url)
    }

    fn fetch_page(&self, offset: Option<&str>) -> Result<ListPage, FetchError> {
        let url = self.list_url(offset)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.credentials.api_key)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "could not read error response".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<ListPage>()?)
    }
}

impl RecordSource for AirtableClient {
    fn describe(&self) -> String {
        format!(
            "Airtable {}/{}",
            self.credentials.base_id, self.credentials.table_name
        )
    }

    fn fetch_all(&self) -> Result<Vec<Record>, FetchError> {
        collect_pages(|offset| self.fetch_page(offset))
    }
}

/// Follow the `offset` cursor from the first page until it is absent or
/// empty, concatenating records in page order. The first error stops the walk.
pub fn collect_pages(
    mut next: impl FnMut(Option<&str>) -> Result<ListPage, FetchError>,
) -> Result<Vec<Record>, FetchError> {
    let mut records = Vec::new();
    let mut offset: Option<String> = None;
    loop {
        let page = next(offset.as_deref())?;
        debug!(count = page.records.len(), "fetched page");
        records.extend(page.records);
        match page.offset {
            Some(cursor) if !cursor.is_empty() => offset = Some(cursor),
            _ => break,
        }
    }
    Ok(records)
}
