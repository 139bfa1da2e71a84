//! CLI flag definitions, mode dispatch, and tracing setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use coursecrawl_core::{DetailsSummary, ProgressReporter};
use coursecrawl_shared::{AppConfig, Mode, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// coursecrawl: list catalog courses or enrich stored course records.
#[derive(Parser)]
#[command(
    name = "coursecrawl",
    version,
    about = "List catalog courses to a delimited file, or enrich stored courses from their detail pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log level.
    #[arg(short, long, value_enum, ignore_case = true, default_value = "error")]
    pub level: LogLevel,

    /// Script mode: list or details.
    #[arg(short, long, default_value_t = Mode::List)]
    pub mode: Mode,

    /// Config file (defaults to ./coursecrawl.toml, then ~/.coursecrawl/coursecrawl.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File the log is appended to.
    #[arg(long, default_value = "dev.log")]
    pub log_file: PathBuf,

    /// Log format: text (default) or json.
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

/// Log severity threshold.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogLevel {
    #[value(alias = "fatal")]
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Crates whose events follow `--level`; everything else stays at error.
const LOG_TARGETS: &[&str] = &[
    "coursecrawl",
    "coursecrawl_core",
    "coursecrawl_catalog",
    "coursecrawl_extractor",
    "coursecrawl_storage",
    "coursecrawl_shared",
];

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing into the log file based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = cli.level.as_directive();
    let directives = std::iter::once("error".to_string())
        .chain(LOG_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .map_err(|e| eyre!("cannot open log file {}: {e}", cli.log_file.display()))?;
    let writer = Mutex::new(file);

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .init();
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mode dispatch
// ---------------------------------------------------------------------------

/// Load config and run the selected pipeline.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    debug!(mode = %cli.mode, "start");
    match cli.mode {
        Mode::List => cmd_list(&config).await?,
        Mode::Details => cmd_details(&config).await?,
    }
    debug!(mode = %cli.mode, "done");

    Ok(())
}

async fn cmd_list(config: &AppConfig) -> Result<()> {
    let summary = coursecrawl_core::run_list(config).await?;

    println!();
    println!("  Course listing written");
    println!("  File:     {}", summary.path.display());
    println!("  Channels: {}", summary.channels);
    println!("  Courses:  {}", summary.rows);
    if !summary.skipped_channels.is_empty() {
        println!("  Skipped:  {:?}", summary.skipped_channels);
    }
    println!("  Time:     {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_details(config: &AppConfig) -> Result<()> {
    let reporter = CliProgress::new();
    let summary = coursecrawl_core::run_details(config, &reporter).await?;

    println!();
    println!("  Enrichment finished");
    println!("  Pending:  {}", summary.total);
    println!("  Updated:  {}", summary.updated);
    println!("  Failed:   {}", summary.failures.len());
    println!("  Time:     {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress bar ticked once per processed course.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{msg}: [{bar:40}] {percent}% ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message("Courses");
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn course_done(&self, _offer_rk: i64, _ok: bool) {
        self.bar.inc(1);
    }

    fn finish(&self, _summary: &DetailsSummary) {
        self.bar.finish();
    }
}
