//! Application configuration for coursecrawl.
//!
//! Config is read from `--config <path>`, else `./coursecrawl.toml`, else
//! `~/.coursecrawl/coursecrawl.toml`. Every field has a default, so a missing
//! file means "all defaults". `DATABASE_URL` and `TABLE_NAME` from the
//! environment override the `[details]` connection settings.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CourseCrawlError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "coursecrawl.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".coursecrawl";

/// Placeholder substituted with the channel id in the course list template.
pub const CHANNEL_ID_PLACEHOLDER: &str = "{channel_id}";

// ---------------------------------------------------------------------------
// Config structs (matching coursecrawl.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub details: DetailsConfig,
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("coursecrawl/", env!("CARGO_PKG_VERSION")).into()
}

/// What list mode does when one channel's page chain fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelErrorPolicy {
    /// Propagate the error and end the run without writing output.
    #[default]
    Abort,
    /// Drop the channel's whole contribution and continue.
    Skip,
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Discovery endpoint listing the channels.
    #[serde(default = "default_channels_url")]
    pub channels_url: String,

    /// First course page of a channel; `{channel_id}` is substituted.
    #[serde(default = "default_courses_url_template")]
    pub courses_url_template: String,

    #[serde(default)]
    pub on_channel_error: ChannelErrorPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            channels_url: default_channels_url(),
            courses_url_template: default_courses_url_template(),
            on_channel_error: ChannelErrorPolicy::default(),
        }
    }
}

fn default_channels_url() -> String {
    "https://www.udemy.com/api-2.0/discovery-units/12016/channels".into()
}
fn default_courses_url_template() -> String {
    "https://www.udemy.com/api-2.0/channels/{channel_id}/courses?is_angular_app=true".into()
}

impl CatalogConfig {
    /// URL of the first course page for `channel_id`.
    pub fn courses_url(&self, channel_id: i64) -> String {
        self.courses_url_template
            .replace(CHANNEL_ID_PLACEHOLDER, &channel_id.to_string())
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the dated output file is written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// File name prefix; the date and `.csv` are appended.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Field separator, `^` or `|` in practice.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_file_prefix() -> String {
    "udemy-courses".into()
}
fn default_delimiter() -> char {
    '^'
}

/// `[details]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsConfig {
    /// libSQL database location. Overridden by `DATABASE_URL`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Table holding the course records. Overridden by `TABLE_NAME`.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            table_name: default_table_name(),
            selectors: SelectorConfig::default(),
        }
    }
}

fn default_database_url() -> String {
    "courses.db".into()
}
fn default_table_name() -> String {
    "courses".into()
}

/// `[details.selectors]` section: the site-specific CSS selector table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Description sections, concatenated in this order.
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,

    /// Row elements that may hold the languages label.
    #[serde(default = "default_language_item")]
    pub language_item: String,

    /// Label element inside a row.
    #[serde(default = "default_language_label")]
    pub language_label: String,

    /// Text the label must contain.
    #[serde(default = "default_language_label_text")]
    pub language_label_text: String,

    /// Value element inside the matching row.
    #[serde(default = "default_language_value")]
    pub language_value: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            language_item: default_language_item(),
            language_label: default_language_label(),
            language_label_text: default_language_label_text(),
            language_value: default_language_value(),
        }
    }
}

fn default_sections() -> Vec<String> {
    ["div#desc", "div#requirements", "div#what-you-get", "div#who-should-attend"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_language_item() -> String {
    "li.list-item".into()
}
fn default_language_label() -> String {
    "span.list-left".into()
}
fn default_language_label_text() -> String {
    "Languages".into()
}
fn default_language_value() -> String {
    "span.list-right".into()
}

// ---------------------------------------------------------------------------
// Validation and overrides
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Apply `DATABASE_URL` / `TABLE_NAME` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            tracing::debug!("database url taken from DATABASE_URL");
            self.details.database_url = url;
        }
        if let Some(table) = lookup("TABLE_NAME").filter(|v| !v.is_empty()) {
            tracing::debug!(%table, "table name taken from TABLE_NAME");
            self.details.table_name = table;
        }
    }

    /// Check the values that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.catalog.channels_url).map_err(|e| {
            CourseCrawlError::config(format!(
                "invalid channels_url '{}': {e}",
                self.catalog.channels_url
            ))
        })?;

        if !self
            .catalog
            .courses_url_template
            .contains(CHANNEL_ID_PLACEHOLDER)
        {
            return Err(CourseCrawlError::config(format!(
                "courses_url_template must contain {CHANNEL_ID_PLACEHOLDER}"
            )));
        }

        let delimiter = self.output.delimiter;
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
            return Err(CourseCrawlError::config(format!(
                "delimiter {delimiter:?} must be a single ASCII character other than a quote or newline"
            )));
        }

        validate_table_name(&self.details.table_name)?;
        Ok(())
    }
}

/// Table names are spliced into SQL, so only plain identifiers are accepted.
pub fn validate_table_name(name: &str) -> Result<()> {
    static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid regex")
    });

    if IDENT_RE.is_match(name) {
        Ok(())
    } else {
        Err(CourseCrawlError::config(format!(
            "table name '{name}' is not a plain SQL identifier"
        )))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.coursecrawl/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CourseCrawlError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.coursecrawl/coursecrawl.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve and load the config, then apply environment overrides and validate.
///
/// An explicit path must exist; the implicit locations fall back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => load_config_from(path)?,
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                load_config_from(&local)?
            } else {
                match config_file_path() {
                    Ok(path) if path.exists() => load_config_from(&path)?,
                    _ => {
                        tracing::debug!("config file not found, using defaults");
                        AppConfig::default()
                    }
                }
            }
        }
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CourseCrawlError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        CourseCrawlError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
