//! Core domain types for the catalog lister and the detail enricher.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CourseCrawlError;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Which pipeline a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Enumerate channels and write the delimited course listing.
    #[default]
    List,
    /// Enrich stored course records from their detail pages.
    Details,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Details => write!(f, "details"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = CourseCrawlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "details" => Ok(Self::Details),
            other => Err(CourseCrawlError::config(format!(
                "unknown mode '{other}': expected 'list' or 'details'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A catalog grouping of courses, as returned by the channels endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub url_title: String,
}

// ---------------------------------------------------------------------------
// CourseRow
// ---------------------------------------------------------------------------

/// Column names of the list-mode output, in write order.
pub const COURSE_HEADER: [&str; 11] = [
    "id",
    "title",
    "url",
    "price",
    "rating",
    "subscribers",
    "reviews",
    "published_lectures",
    "level",
    "duration",
    "published_at",
];

/// One list-mode course, mapped field-for-field from the upstream JSON.
///
/// Values are carried untyped: a key absent upstream is [`Value::Null`] here
/// and an empty cell in the output, the same cell an empty string produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRow {
    pub id: Value,
    pub title: Value,
    pub url: Value,
    pub price: Value,
    pub rating: Value,
    pub subscribers: Value,
    pub reviews: Value,
    pub published_lectures: Value,
    pub level: Value,
    pub duration: Value,
    pub published_at: Value,
}

impl CourseRow {
    /// Render the row as output cells, in [`COURSE_HEADER`] order.
    pub fn to_record(&self) -> [String; 11] {
        [
            &self.id,
            &self.title,
            &self.url,
            &self.price,
            &self.rating,
            &self.subscribers,
            &self.reviews,
            &self.published_lectures,
            &self.level,
            &self.duration,
            &self.published_at,
        ]
        .map(cell)
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Detail mode
// ---------------------------------------------------------------------------

/// A persisted course awaiting enrichment (`full_desc_uploaded_flg = 0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCourse {
    /// Primary key, never modified by this system.
    pub offer_rk: i64,
    /// Detail page URL; `None` when the column is NULL.
    pub url: Option<String>,
}

/// Fields scraped from a course detail page.
///
/// `None` means extraction failed for that field and NULL is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDetails {
    pub description: Option<String>,
    pub language: Option<String>,
}
