//! Details mode: enrich pending course records from their detail pages.
//!
//! Each course is its own unit of work. A failed fetch or update is logged
//! and recorded, leaving the row flagged for the next run; a field that
//! cannot be extracted is logged and written as NULL.

use std::time::Instant;

use tracing::{debug, error, info, instrument};

use coursecrawl_extractor::{DetailFetcher, SelectorTable, extract_fields};
use coursecrawl_shared::{AppConfig, CourseCrawlError, CourseDetails, Result, StoredCourse};
use coursecrawl_storage::Storage;

use crate::progress::ProgressReporter;

/// A course whose enrichment did not complete.
#[derive(Debug, Clone)]
pub struct CourseFailure {
    pub offer_rk: i64,
    pub url: String,
    pub message: String,
}

/// Result of a details-mode pass.
#[derive(Debug)]
pub struct DetailsSummary {
    /// Records selected for enrichment.
    pub total: usize,
    /// Records updated and flagged done.
    pub updated: usize,
    pub failures: Vec<CourseFailure>,
    pub elapsed: std::time::Duration,
}

/// Run details mode over every record with `full_desc_uploaded_flg = 0`.
///
/// Only setup failures (bad selectors, unreachable database, failed
/// selection) return `Err`; per-course failures land in the summary.
#[instrument(skip_all, fields(table = %config.details.table_name))]
pub async fn run_details(
    config: &AppConfig,
    progress: &dyn ProgressReporter,
) -> Result<DetailsSummary> {
    let start = Instant::now();

    let selectors = SelectorTable::compile(&config.details.selectors)?;
    let fetcher = DetailFetcher::new(&config.http)?;
    let storage = Storage::open(&config.details.database_url, &config.details.table_name).await?;

    let courses = storage.pending_courses().await?;
    info!(pending = courses.len(), "starting enrichment");
    progress.start(courses.len());

    let mut updated = 0usize;
    let mut failures = Vec::new();

    for course in &courses {
        debug!(offer_rk = course.offer_rk, url = course_url(course), "enriching course");

        match enrich_course(&fetcher, &storage, &selectors, course).await {
            Ok(()) => {
                updated += 1;
                progress.course_done(course.offer_rk, true);
            }
            Err(e) => {
                log_failure(course, &e);
                failures.push(CourseFailure {
                    offer_rk: course.offer_rk,
                    url: course_url(course).to_string(),
                    message: e.to_string(),
                });
                progress.course_done(course.offer_rk, false);
            }
        }
    }

    let summary = DetailsSummary {
        total: courses.len(),
        updated,
        failures,
        elapsed: start.elapsed(),
    };
    progress.finish(&summary);

    info!(
        total = summary.total,
        updated = summary.updated,
        failed = summary.failures.len(),
        duration_ms = summary.elapsed.as_millis(),
        "enrichment completed"
    );

    Ok(summary)
}

/// Fetch, extract and persist one course.
async fn enrich_course(
    fetcher: &DetailFetcher,
    storage: &Storage,
    selectors: &SelectorTable,
    course: &StoredCourse,
) -> Result<()> {
    let url = course
        .url
        .as_deref()
        .ok_or_else(|| CourseCrawlError::fetch("-", "record has no url"))?;
    let html = fetcher.fetch_html(url).await?;
    let fields = extract_fields(&html, selectors);

    let language = match fields.language {
        Ok(language) => Some(language),
        Err(e) => {
            log_failure(course, &e);
            None
        }
    };

    let details = CourseDetails {
        description: Some(fields.description),
        language,
    };

    storage.update_course_details(course.offer_rk, &details).await
}

fn course_url(course: &StoredCourse) -> &str {
    course.url.as_deref().unwrap_or("")
}

fn log_failure(course: &StoredCourse, e: &CourseCrawlError) {
    error!(
        offer_rk = course.offer_rk,
        url = course_url(course),
        error = %e,
        detail = ?e,
        "course enrichment failed"
    );
}
