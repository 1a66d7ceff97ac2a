//! CLI argument definitions for `run-etl`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "run-etl",
    version,
    about = "Customer transactions ETL - extract, clean, merge and load",
    long_about = "Extract transactions from the source database and customers from CSV,\n\
                  clean and merge them, find high-value customers, and load the merged\n\
                  table with its indexes and views into the target database."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline for an environment.
    Run(RunArgs),

    /// Resolve and print the configuration for an environment.
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Environment to run in: dev, test or prod.
    #[arg(value_name = "ENV")]
    pub environment: String,

    /// Spend above which a customer is high value (overrides HIGH_VALUE_THRESHOLD).
    #[arg(long = "threshold", value_name = "AMOUNT")]
    pub threshold: Option<String>,

    /// How the merged table is written.
    #[arg(long = "write-mode", value_enum, default_value = "replace")]
    pub write_mode: WriteModeArg,

    /// Directory for CSV audit snapshots (overrides OUTPUT_DIR).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip writing CSV audit snapshots.
    #[arg(long = "no-snapshots")]
    pub no_snapshots: bool,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Environment to resolve: dev, test or prod.
    #[arg(value_name = "ENV")]
    pub environment: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WriteModeArg {
    /// Drop and recreate the merged table.
    Replace,
    /// Insert or update rows keyed on transaction_id.
    Upsert,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
