//! List mode: channels → course pages → rows → delimited file.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, instrument};

use coursecrawl_catalog::{CatalogClient, output_path, write_courses};
use coursecrawl_shared::{AppConfig, ChannelErrorPolicy, Result};

/// Result of a list-mode run.
#[derive(Debug)]
pub struct ListSummary {
    /// File the listing was written to.
    pub path: PathBuf,
    /// Channels walked, the synthetic one included.
    pub channels: usize,
    /// Data rows written.
    pub rows: usize,
    /// Channels dropped under [`ChannelErrorPolicy::Skip`].
    pub skipped_channels: Vec<i64>,
    pub elapsed: std::time::Duration,
}

/// Run list mode, naming the output after today's local date.
pub async fn run_list(config: &AppConfig) -> Result<ListSummary> {
    run_list_dated(config, Local::now().date_naive()).await
}

/// Run list mode with an explicit output date.
///
/// Channels are walked in listing order; each contributes all of its pages
/// or, on failure, nothing. Under [`ChannelErrorPolicy::Abort`] the first
/// failing channel ends the run before any file is written.
#[instrument(skip_all, fields(%date))]
pub async fn run_list_dated(config: &AppConfig, date: NaiveDate) -> Result<ListSummary> {
    let start = Instant::now();
    let client = CatalogClient::new(&config.http, config.catalog.clone())?;

    let channels = client.fetch_channels().await?;

    let mut rows = Vec::new();
    let mut skipped_channels = Vec::new();

    for channel in &channels {
        debug!(channel_id = channel.id, title = %channel.title, "fetching channel courses");

        match client.fetch_channel_courses(channel.id).await {
            Ok(channel_rows) => rows.extend(channel_rows),
            Err(e) => match config.catalog.on_channel_error {
                ChannelErrorPolicy::Abort => return Err(e),
                ChannelErrorPolicy::Skip => {
                    error!(channel_id = channel.id, title = %channel.title, error = %e, "channel skipped");
                    skipped_channels.push(channel.id);
                }
            },
        }
    }

    let path = output_path(&config.output, date);
    let written = write_courses(&path, config.output.delimiter, &rows)?;

    let summary = ListSummary {
        path,
        channels: channels.len(),
        rows: written,
        skipped_channels,
        elapsed: start.elapsed(),
    };

    info!(
        channels = summary.channels,
        rows = summary.rows,
        skipped = summary.skipped_channels.len(),
        duration_ms = summary.elapsed.as_millis(),
        "list completed"
    );

    Ok(summary)
}
