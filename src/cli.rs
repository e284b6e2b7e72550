//! Command-line arguments for the `quote` binary

use std::path::PathBuf;

use clap::{Args, Parser};
use jiff::civil::DateTime;

use crate::{checkout::PaymentMethod, logging::LogFormat};

/// How `quote` prints its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable receipt
    Table,

    /// Order pricing snapshot as JSON
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Price a fixture cart
#[derive(Debug, Parser)]
#[command(name = "quote", version)]
pub struct QuoteArgs {
    /// Fixture set holding the catalog, promotions, config and cart
    #[arg(short, long, default_value = "home_services")]
    pub fixture: String,

    /// Directory the fixture sets live in
    #[arg(long, env = "QUOTE_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Promo code to apply, instead of the one saved with the cart
    #[arg(short, long)]
    pub promo: Option<String>,

    /// Customer to price for, instead of the one saved with the cart
    #[arg(short, long)]
    pub user: Option<String>,

    /// Local date-time to price at, e.g. 2026-03-15T10:30 (defaults to now)
    #[arg(long)]
    pub now: Option<DateTime>,

    /// Payment method used when placing the order
    #[arg(long, value_enum, default_value_t = PaymentMethod::Online)]
    pub payment_method: PaymentMethod,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Logging
    #[command(flatten)]
    pub logging: LoggingArgs,
}
