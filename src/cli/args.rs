//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, copy_master::CopyMasterArgs, hello::HelloArgs,
    import::ImportArgs, init::InitArgs, read_csv::ReadCsvArgs, status::StatusArgs,
};

#[derive(Parser)]
#[command(name = "nutri")]
#[command(author, version, about = "Fast-food nutrition data importer")]
#[command(
    long_about = "Imports fast-food chains, food groups, master products and yearly nutrition data from CSV files into an entity store."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (per-row log lines)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .nutri/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Entity store file (default: .nutri/store.db in the project)
    #[arg(long, global = true, env = "NUTRI_STORE")]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new nutri project
    Init(InitArgs),

    /// Say hello
    Hello(HelloArgs),

    /// Read a CSV file and display its rows
    ReadCsv(ReadCsvArgs),

    /// Import a CSV file into the entity store
    Import(ImportArgs),

    /// Create year-scoped products from all master products
    CopyMaster(CopyMasterArgs),

    /// Show record counts in the entity store
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and summaries
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Tab-separated values (for piping)
    Tsv,
    /// Markdown tables
    Md,
}
