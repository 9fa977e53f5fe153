//! CLI parse: clap types for spend-monitor. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// spend-monitor CLI - partner spend reports and their warehouse tables
#[derive(Parser)]
#[command(name = "spend-monitor")]
#[command(about = "Maintain partner/advertiser config tables, spend reports and external tables")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a report for every partner without one and record its id
    GenerateReports,
    /// Reset both configuration tables and create missing external tables
    Init,
    /// Create or update the external warehouse tables
    SyncTables {
        /// Only create missing tables; leave existing ones unchanged
        #[arg(long)]
        create_only: bool,
    },
    /// Print the records of a configuration table
    Show {
        #[arg(value_enum)]
        table: TableArg,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Fetch the report definition of a partner
    Report {
        /// Partner id as written in the partner table
        partner_id: String,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableArg {
    Partners,
    Advertisers,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
