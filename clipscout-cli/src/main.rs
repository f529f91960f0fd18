// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! clipscout CLI - resolve a post URL to direct video download URLs.
//!
//! # Examples
//!
//! ```bash
//! # Resolve a post and list its quality variants
//! clipscout https://x.com/someone/status/1790000000000000001
//!
//! # Print only the best variant URL (for piping into a downloader)
//! clipscout --best https://x.com/someone/status/1790000000000000001
//!
//! # JSON output
//! clipscout --format json --pretty https://x.com/someone/status/123
//!
//! # Wider browser pool for batch scripting
//! clipscout --pool-size 4 https://x.com/someone/status/123
//! ```

mod output;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use clipscout_core::ResolveError;
use clipscout_resolve::{Orchestrator, ResolveContext, ResolveSettings};
use clipscout_strategies::default_strategies;

// ============================================================================
// CLI Definition
// ============================================================================

/// clipscout - social-media video resolution.
#[derive(Parser)]
#[command(name = "clipscout")]
#[command(about = "Resolves a post URL to direct, ranked video download URLs")]
#[command(version)]
pub struct Cli {
    /// The post URL to resolve.
    pub url: String,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Print only the best variant URL.
    #[arg(long)]
    pub best: bool,

    /// Maximum number of concurrent headless browser instances.
    #[arg(long, default_value_t = 2)]
    pub pool_size: usize,

    /// Timeout in seconds for the API strategies.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Verbose output (per-strategy attempt log).
    #[arg(long, short)]
    pub verbose: bool,

    /// Quiet mode (suppress logging).
    #[arg(long, short)]
    pub quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The input URL is not a supported post reference.
    InvalidReference = 2,
    /// The provider confirmed the content is gone or restricted.
    ContentUnavailable = 3,
    /// Every strategy was tried and failed.
    Exhausted = 4,
}

impl From<&ResolveError> for ExitCode {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::InvalidReference(_) => Self::InvalidReference,
            ResolveError::ContentUnavailable(_) => Self::ContentUnavailable,
            ResolveError::StrategyExhausted(_) => Self::Exhausted,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("clipscout=debug,info")
    } else {
        EnvFilter::new("clipscout=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut settings = ResolveSettings::default().with_pool_size(cli.pool_size);
    if let Some(secs) = cli.timeout {
        settings = settings.with_api_timeouts(Duration::from_secs(secs));
    }

    let ctx = ResolveContext::with_settings(settings);
    let orchestrator = Orchestrator::with_strategies(ctx, default_strategies());

    let outcome = orchestrator.resolve_outcome(&cli.url).await;
    orchestrator.context().shutdown().await;

    match &outcome.result {
        Ok(result) => {
            if cli.best {
                println!("{}", result.best().url);
            } else if cli.format == OutputFormat::Json {
                output::print_json(result, cli.pretty)?;
            } else {
                output::print_text(result, &outcome, cli.verbose);
            }
            Ok(())
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e}");
            }
            std::process::exit(ExitCode::from(e) as i32);
        }
    }
}
