//! Error types for coursecrawl.
//!
//! Library crates use [`CourseCrawlError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all coursecrawl operations.
#[derive(Debug, thiserror::Error)]
pub enum CourseCrawlError {
    /// Transport failure or non-2xx response.
    #[error("fetch error: {url}: {message}")]
    Fetch { url: String, message: String },

    /// Response parsed as JSON but an expected key is missing or malformed.
    #[error("schema error: {url}: missing or invalid `{key}`")]
    Schema { url: String, key: String },

    /// An HTML selector did not match, or its content could not be read.
    #[error("extraction error: {message}")]
    Extraction { message: String },

    /// Database read or write failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Delimited output could not be written.
    #[error("output error: {0}")]
    Output(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CourseCrawlError>;

impl CourseCrawlError {
    /// Create a fetch error for `url`.
    pub fn fetch(url: impl Into<String>, msg: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: msg.to_string(),
        }
    }

    /// Create a schema error for a missing/invalid `key` in the body fetched from `url`.
    pub fn schema(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Schema {
            url: url.into(),
            key: key.into(),
        }
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CourseCrawlError::config("unknown mode 'foo'");
        assert_eq!(err.to_string(), "config error: unknown mode 'foo'");

        let err = CourseCrawlError::schema("https://api.example.com/channels", "results");
        assert!(err.to_string().contains("`results`"));

        let err = CourseCrawlError::fetch("https://example.com/course/1", "HTTP 500");
        assert_eq!(
            err.to_string(),
            "fetch error: https://example.com/course/1: HTTP 500"
        );
    }
}
