//! KBO record crawler CLI
//!
//! Crawls one season (or month) of batting records and saves them locally.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use kbo_crawler::{
    error::{AppError, Result},
    models::{Config, CrawlParams},
    pipeline::{self, ExportFormat},
};

/// Exit code for a crawl that produced no records.
const EXIT_EMPTY: u8 = 2;

/// KBO batting record crawler
#[derive(Parser, Debug)]
#[command(
    name = "kbo-crawler",
    version,
    about = "Crawls paginated KBO batting record pages"
)]
struct Cli {
    /// Season year to crawl
    #[arg(long)]
    year: i32,

    /// Month within the season (1-12)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Seconds to wait between page requests (overrides config)
    #[arg(long)]
    delay: Option<f64>,

    /// Number of pages to crawl instead of reading the pager
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Output file
    #[arg(long, default_value = "batting_monthly.csv")]
    out: PathBuf,

    /// Output format: csv or json (default: from the --out extension)
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "kbo.toml")]
    config: PathBuf,

    /// Override the record page URL
    #[arg(long)]
    url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging; `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Apply command-line overrides on top of the file configuration.
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(delay) = cli.delay {
        if !delay.is_finite() || delay < 0.0 {
            return Err(AppError::validation(format!(
                "--delay must be a non-negative number of seconds, got {delay}"
            )));
        }
        config.crawler.request_delay_ms = (delay * 1000.0).round() as u64;
    }
    if let Some(url) = &cli.url {
        config.site.base_url = url.clone();
    }
    Ok(())
}

/// Set the cancel flag on Ctrl-C; the session stops before its next page.
fn spawn_interrupt_handler(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, stopping after the current page");
            cancel.store(true, Ordering::Relaxed);
        }
    });
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };
    apply_overrides(&mut config, &cli)?;

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let params = CrawlParams {
        year: cli.year,
        month: cli.month,
        max_pages: cli.max_pages,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(Arc::clone(&cancel));

    let result = pipeline::run_crawler(Arc::new(config), params, cancel).await?;

    if result.is_empty() {
        log::error!(
            "No records collected for {}",
            pipeline::period_label(&params)
        );
        return Ok(ExitCode::from(EXIT_EMPTY));
    }

    let format = cli
        .format
        .unwrap_or_else(|| ExportFormat::from_path(&cli.out));
    let rows = pipeline::write_result(&result, &cli.out, format)?;
    log::info!("[ok] saved rows={} -> {} ({})", rows, cli.out.display(), format);

    Ok(ExitCode::SUCCESS)
}
