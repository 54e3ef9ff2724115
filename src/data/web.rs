//! Remote source: scrape the acquisitions table from a web page.

use reqwest::blocking::Client;
use tracing::debug;

use crate::data::html::parse_tables;
use crate::data::selector::TableSelector;
use crate::data::{SourceResult, SourceUnavailable, TableSource};
use crate::domain::{RawTable, SourceTag, WebSourceConfig};

pub struct WebFetcher {
    config: WebSourceConfig,
    selector: Box<dyn TableSelector>,
}

impl WebFetcher {
    /// Fetcher using the table rule from `config`.
    pub fn new(config: WebSourceConfig) -> Self {
        let selector = Box::new(config.table.clone());
        Self { config, selector }
    }

    /// Replace the table rule with a custom strategy.
    pub fn with_selector(mut self, selector: Box<dyn TableSelector>) -> Self {
        self.selector = selector;
        self
    }

    fn fetch_html(&self) -> Result<String, String> {
        let client = Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;

        let resp = client.get(&self.config.url).send().map_err(|e| {
            if e.is_timeout() {
                format!(
                    "request to {} timed out after {}s",
                    self.config.url,
                    self.config.timeout.as_secs()
                )
            } else {
                format!("request to {} failed: {e}", self.config.url)
            }
        })?;

        if !resp.status().is_success() {
            return Err(format!("request to {} failed with status {}", self.config.url, resp.status()));
        }

        resp.text()
            .map_err(|e| format!("failed to read response body: {e}"))
    }
}

impl TableSource for WebFetcher {
    fn tag(&self) -> SourceTag {
        SourceTag::Web
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.config.url, self.selector.describe())
    }

    fn load(&self) -> SourceResult {
        let html = self
            .fetch_html()
            .map_err(|cause| SourceUnavailable::new(SourceTag::Web, cause))?;
        debug!(bytes = html.len(), "fetched page");

        table_from_html(&html, self.selector.as_ref())
            .map_err(|cause| SourceUnavailable::new(SourceTag::Web, cause))
    }
}

/// Parse `html` and pick one table with `selector`.
pub fn table_from_html(html: &str, selector: &dyn TableSelector) -> Result<RawTable, String> {
    let tables = parse_tables(html)?;
    debug!(tables = tables.len(), rule = %selector.describe(), "parsed page tables");

    let picked = selector.select(&tables)?;
    if picked.table.is_empty() {
        return Err(format!("table selected by '{}' has no data rows", selector.describe()));
    }
    Ok(picked.table.clone())
}
