//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Concurrent smoke-test harness
#[derive(Parser, Debug)]
#[command(name = "soundcheck")]
#[command(version)]
#[command(about = "Run suites of HTTP and command checks with bounded concurrency")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the checks declared in a suite file
    Run(RunArgs),

    /// List the checks declared in a suite file
    List(ListArgs),

    /// Validate a suite file without running it
    Validate(ValidateArgs),

    /// Write an example suite file
    Init(InitArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite file (YAML or JSON)
    #[arg(short, long, default_value = "soundcheck.yaml")]
    pub suite: String,

    /// Maximum concurrent checks (overrides suite defaults)
    #[arg(short, long)]
    pub concurrent: Option<usize>,

    /// Per-attempt timeout in milliseconds (overrides suite defaults)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Retry attempts after the first failure (overrides suite defaults)
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Stop admitting checks once any failure is recorded
    #[arg(long)]
    pub stop_on_error: bool,

    /// Only run checks whose id contains this substring
    #[arg(long)]
    pub filter: Option<String>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Write the report to a file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Suite file (YAML or JSON)
    #[arg(short, long, default_value = "soundcheck.yaml")]
    pub suite: String,

    /// Show timeout and retry columns
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Suite file to validate
    pub suite: String,
}

/// Arguments for init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the example suite
    #[arg(short, long, default_value = "soundcheck.yaml")]
    pub output: String,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}
