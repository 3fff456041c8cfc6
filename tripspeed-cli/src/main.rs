//! tripspeed CLI: trip feature engineering and speed regression.
//!
//! Preprocesses raw trip CSVs into feature tables, fits the speed model, and
//! summarizes feature distributions.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use tripspeed_core::DatetimePeriod;

/// tripspeed: ride-hailing trip features and speed prediction
#[derive(Parser, Debug)]
#[command(name = "tripspeed", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Derive and filter features for a trip CSV
    Preprocess {
        /// Raw trip CSV
        input: PathBuf,
        /// Output CSV (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Hour period: day or week
        #[arg(long)]
        period: Option<DatetimePeriod>,
        /// Hour bucket width in hours
        #[arg(long)]
        bin_width: Option<f64>,
    },
    /// Fit the speed model on a trip CSV and score it on a held-out split
    Train {
        /// Raw trip CSV
        input: PathBuf,
        /// Use separate weekday/weekend time features
        #[arg(long)]
        separate_weekend: bool,
        /// Target column
        #[arg(long)]
        target: Option<String>,
        /// Share of rows held out for scoring
        #[arg(long)]
        test_fraction: Option<f64>,
        /// Seed for the split and SGD shuffling
        #[arg(long)]
        seed: Option<u64>,
        /// Write test-row predictions to this CSV
        #[arg(long)]
        predictions: Option<PathBuf>,
    },
    /// Summary statistics of every feature column after preprocessing
    Describe {
        /// Raw trip CSV
        input: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Target file (defaults to the user config file)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show current configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "tripspeed", "tripspeed")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tripspeed.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    commands::handle_command(cli.command, cli.config.as_deref())
}
