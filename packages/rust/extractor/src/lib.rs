//! Course detail page fetching and HTML field extraction.
//!
//! This crate provides:
//! - [`SelectorTable`]: the compiled, configurable selector set
//! - [`DetailFetcher`]: one GET per course detail page
//! - [`extract_fields`]: description + language from a fetched page

mod extract;
mod selectors;

use std::time::Duration;

use coursecrawl_shared::{CourseCrawlError, HttpConfig, Result};
use reqwest::Client;
use scraper::Html;
use tracing::debug;

pub use extract::{extract_description, extract_language};
pub use selectors::SelectorTable;

const MAX_REDIRECTS: usize = 5;

/// Fields extracted from one detail page.
///
/// The description cannot fail once selectors are compiled; the language
/// carries its own error so the caller can log it and write NULL.
#[derive(Debug)]
pub struct ExtractedFields {
    pub description: String,
    pub language: Result<String>,
}

/// Parse `html` and extract both detail fields.
pub fn extract_fields(html: &str, selectors: &SelectorTable) -> ExtractedFields {
    let doc = Html::parse_document(html);
    ExtractedFields {
        description: extract_description(&doc, selectors),
        language: extract_language(&doc, selectors),
    }
}

// ---------------------------------------------------------------------------
// DetailFetcher
// ---------------------------------------------------------------------------

/// HTTP client for course detail pages.
pub struct DetailFetcher {
    client: Client,
}

impl DetailFetcher {
    /// Create a fetcher using the `[http]` settings.
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| {
                CourseCrawlError::fetch("-", format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }

    /// GET a detail page and return its body.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching detail page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CourseCrawlError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CourseCrawlError::fetch(url, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| CourseCrawlError::fetch(url, format!("body read failed: {e}")))
    }
}
