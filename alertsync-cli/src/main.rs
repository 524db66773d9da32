//! alertsync: reconcile alert query and suppression specs with Snowflake.
//!
//! # Usage
//!
//! ```text
//! alertsync query <username> <config-file> [--dry-run]
//! alertsync suppression [--dir <path>] [--dry-run]
//! alertsync init-tables [--user <name>]
//! ```
//!
//! Store settings come from the environment; see `alertsync_store::config`.

mod commands;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init_tables::InitTablesArgs, query::QueryArgs, suppression::SuppressionArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "alertsync",
    version,
    about = "Sync alert query and suppression specs from config files into Snowflake",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile `query_spec` blocks from one config file with the queries table.
    Query(QueryArgs),

    /// Reconcile every `*.qs` file below a directory with the suppressions table.
    Suppression(SuppressionArgs),

    /// Create the spec tables if they do not exist.
    InitTables(InitTablesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Query(args) => args.run(),
        Commands::Suppression(args) => args.run(),
        Commands::InitTables(args) => args.run(),
    }
}

/// Logs go to stderr; stdout carries the change report and the prompt.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
