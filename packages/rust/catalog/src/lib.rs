//! Catalog listing: channels, paginated course pages, and delimited output.
//!
//! The catalog API exposes one channel listing (a single page) and, per
//! channel, a chain of course pages linked by a `next` cursor. [`CoursePages`]
//! walks that chain iteratively; a channel yields all of its pages or an error.

mod mapper;
mod writer;

use coursecrawl_shared::{CatalogConfig, Channel, CourseCrawlError, CourseRow, HttpConfig, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

pub use mapper::map_course;
pub use writer::{output_path, write_courses};

/// Maximum number of redirects to follow for catalog requests.
const MAX_REDIRECTS: usize = 5;

/// Id of the channel that is always spliced into the listing.
pub const BUSINESS_CHANNEL_ID: i64 = 1624;

/// The synthetic Business channel, inserted at index 1 of every listing.
pub fn business_channel() -> Channel {
    Channel {
        id: BUSINESS_CHANNEL_ID,
        title: "Business".into(),
        url_title: "/courses/business/".into(),
    }
}

// ---------------------------------------------------------------------------
// CatalogClient
// ---------------------------------------------------------------------------

/// HTTP client for the channel and course-list endpoints.
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a client using the `[http]` and `[catalog]` settings.
    pub fn new(http: &HttpConfig, config: CatalogConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(http)?,
            config,
        })
    }

    /// Fetch the channel listing and splice in the Business channel.
    #[instrument(skip_all, fields(url = %self.config.channels_url))]
    pub async fn fetch_channels(&self) -> Result<Vec<Channel>> {
        let url = &self.config.channels_url;
        let body = fetch_json(&self.client, url).await?;
        let mut channels = parse_channels(url, &body)?;
        insert_business_channel(&mut channels);

        info!(channels = channels.len(), "channel listing fetched");
        Ok(channels)
    }

    /// Cursor over the course pages of one channel.
    pub fn course_pages(&self, channel_id: i64) -> CoursePages<'_> {
        CoursePages {
            client: &self.client,
            next: Some(self.config.courses_url(channel_id)),
        }
    }

    /// Fetch every course page of a channel and map the results, in page order.
    ///
    /// Any failing page fails the whole channel; partial results are discarded.
    #[instrument(skip(self))]
    pub async fn fetch_channel_courses(&self, channel_id: i64) -> Result<Vec<CourseRow>> {
        let mut pages = self.course_pages(channel_id);
        let mut rows = Vec::new();
        let mut page_count = 0usize;

        while let Some(page) = pages.next_page().await? {
            page_count += 1;
            rows.extend(page.results.iter().map(map_course));
        }

        debug!(pages = page_count, courses = rows.len(), "channel exhausted");
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a channel's course listing.
#[derive(Debug, Clone)]
pub struct CoursePage {
    /// URL the page was fetched from.
    pub url: String,
    /// Raw course objects, in upstream order.
    pub results: Vec<Value>,
    /// Absolute URL of the following page, if any.
    pub next: Option<String>,
}

/// Iterative cursor following the `next` links of a course listing.
pub struct CoursePages<'a> {
    client: &'a Client,
    next: Option<String>,
}

impl CoursePages<'_> {
    /// Fetch the next page, or `None` once a page with `next: null` was returned.
    pub async fn next_page(&mut self) -> Result<Option<CoursePage>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let body = fetch_json(self.client, &url).await?;
        let page = parse_course_page(&url, &body)?;
        debug!(url = %page.url, next = ?page.next, results = page.results.len(), "course page fetched");

        self.next = page.next.clone();
        Ok(Some(page))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Read the `results` array of a channel listing into [`Channel`]s.
fn parse_channels(url: &str, body: &Value) -> Result<Vec<Channel>> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| CourseCrawlError::schema(url, "results"))?;

    results
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<Channel>(item.clone())
                .map_err(|_| CourseCrawlError::schema(url, format!("results[{i}]")))
        })
        .collect()
}

/// Insert the Business channel at index 1, or as the sole entry of an empty list.
fn insert_business_channel(channels: &mut Vec<Channel>) {
    let index = channels.len().min(1);
    channels.insert(index, business_channel());
}

/// Split a course page into its results and resolved `next` cursor.
fn parse_course_page(url: &str, body: &Value) -> Result<CoursePage> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| CourseCrawlError::schema(url, "results"))?
        .clone();

    let next = match body.get("next") {
        None | Some(Value::Null) => None,
        Some(Value::String(next)) => Some(resolve_cursor(url, next)?),
        Some(_) => return Err(CourseCrawlError::schema(url, "next")),
    };

    Ok(CoursePage {
        url: url.to_string(),
        results,
        next,
    })
}

/// Cursors are full URLs in practice; relative ones resolve against the current page.
fn resolve_cursor(current: &str, next: &str) -> Result<String> {
    let base = Url::parse(current).map_err(|e| CourseCrawlError::fetch(current, e))?;
    base.join(next)
        .map(String::from)
        .map_err(|_| CourseCrawlError::schema(current, "next"))
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(http: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(http.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(std::time::Duration::from_secs(http.timeout_secs))
        .build()
        .map_err(|e| CourseCrawlError::fetch("-", format!("failed to build HTTP client: {e}")))
}

/// GET `url` and decode the body as JSON.
async fn fetch_json(client: &Client, url: &str) -> Result<Value> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CourseCrawlError::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CourseCrawlError::fetch(url, format!("HTTP {status}")));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| CourseCrawlError::fetch(url, format!("invalid JSON body: {e}")))
}
