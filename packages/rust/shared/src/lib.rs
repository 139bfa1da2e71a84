//! Shared types, error model, and configuration for coursecrawl.
//!
//! This crate is the foundation depended on by all other coursecrawl crates.
//! It provides:
//! - [`CourseCrawlError`]: the unified error type
//! - Domain types ([`Channel`], [`CourseRow`], [`StoredCourse`], [`CourseDetails`], [`Mode`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, ChannelErrorPolicy, DetailsConfig, HttpConfig, OutputConfig,
    SelectorConfig, config_dir, config_file_path, load_config, load_config_from, validate_table_name,
};
pub use error::{CourseCrawlError, Result};
pub use types::{COURSE_HEADER, Channel, CourseDetails, CourseRow, Mode, StoredCourse};
