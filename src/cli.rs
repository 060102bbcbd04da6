//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # List clusters of byte-identical files
//! distinctpics scan ~/Pictures
//!
//! # Show what would be removed, keeping the first file of every cluster
//! distinctpics scan ~/Pictures --delete --dry-run
//!
//! # Machine-readable report
//! distinctpics scan ~/Pictures --output json
//!
//! # Copy photos into <dest>/<year>/<month> folders
//! distinctpics sort ~/Camera ~/Pictures --copy
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Find byte-identical duplicate files and organize photos by date.
#[derive(Debug, Parser)]
#[command(name = "distinctpics")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree for byte-identical files
    Scan(ScanArgs),
    /// Move or copy files into year/month folders
    Sort(SortArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan (subdirectories included)
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Remove duplicates, keeping the first file of each cluster
    #[arg(long)]
    pub delete: bool,

    /// Report what --delete would remove without touching any file
    #[arg(long, requires = "delete")]
    pub dry_run: bool,

    /// Delete permanently instead of moving to the trash
    #[arg(long, requires = "delete")]
    pub permanent: bool,

    /// Skip unreadable directories instead of aborting the scan
    #[arg(long)]
    pub skip_unreadable: bool,

    /// Abort on the first file that cannot be read during comparison
    #[arg(long)]
    pub strict: bool,

    /// Number of worker threads comparing files (default: 4)
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the sort subcommand.
#[derive(Debug, Args)]
pub struct SortArgs {
    /// Folder to take files from
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Folder where files are organized by year and month
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Copy files instead of moving them
    #[arg(short, long)]
    pub copy: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Paths grouped by cluster, one per line
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
