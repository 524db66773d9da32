pub mod init_tables;
pub mod query;
pub mod suppression;

use std::io;

use anyhow::{Context, Result};
use colored::Colorize;

use alertsync_core::Spec;
use alertsync_store::{SnowflakeStore, StoreConfig};
use alertsync_sync::{
    confirm,
    pipeline::{self, RunStatus},
    SyncError,
};

use crate::report;

/// Reconcile `desired` with the store described by `config`, ask, and apply.
pub(crate) fn sync_specs<S: Spec>(desired: &[S], config: StoreConfig, dry_run: bool) -> Result<()> {
    let table = config.qualified_table(S::KIND);
    tracing::info!(
        "syncing {} {} spec(s) from config into {table} as {}",
        desired.len(),
        S::KIND,
        config.user
    );

    let mut store = SnowflakeStore::new(config);
    let outcome = pipeline::run(&mut store, desired, dry_run, |changes| {
        report::print_changes(changes, "");
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        confirm::read_confirmation(&mut stdin.lock(), &mut stdout).map_err(SyncError::Confirm)
    })
    .with_context(|| format!("{} sync against {table} failed", S::KIND))?;

    match outcome.status {
        RunStatus::UpToDate => {
            println!("{} {table} matches config; nothing to do", "✓".green().bold());
        }
        RunStatus::DryRun => {
            report::print_changes(&outcome.changes, "[dry-run] ");
            println!("[dry-run] {} change(s) not written", outcome.changes.len());
        }
        RunStatus::Declined => println!("Changes not applied."),
        RunStatus::Applied => report::print_applied(&outcome.applied),
    }
    Ok(())
}
