//! Shared sync entrypoint used by every CLI command.
//!
//! read store → reconcile → gate → apply

use alertsync_core::Spec;
use alertsync_store::{records, SpecStore};

use crate::error::SyncError;
use crate::reconcile::{reconcile, ChangeSet};
use crate::writer::{apply, ApplyResult};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Config and store already agree; the gate was not consulted.
    UpToDate,
    /// `dry_run` was set; the gate was not consulted.
    DryRun,
    /// The gate said no.
    Declined,
    /// Every change was written.
    Applied,
}

/// Everything a run computed and did.
#[derive(Debug)]
pub struct RunReport<S> {
    pub changes: ChangeSet<S>,
    pub status: RunStatus,
    pub applied: Vec<ApplyResult>,
}

/// Read the store and reconcile it against `desired`. No writes.
pub fn plan<S: Spec>(
    store: &mut impl SpecStore,
    desired: &[S],
) -> Result<ChangeSet<S>, SyncError> {
    let actual = records::read_specs::<S>(store)?;
    Ok(reconcile(desired, &actual))
}

/// Plan, ask `confirm`, and apply when it returns `true`.
///
/// `confirm` sees the full change set so it can present it before asking.
pub fn run<S, F>(
    store: &mut impl SpecStore,
    desired: &[S],
    dry_run: bool,
    confirm: F,
) -> Result<RunReport<S>, SyncError>
where
    S: Spec,
    F: FnOnce(&ChangeSet<S>) -> Result<bool, SyncError>,
{
    let changes = plan(store, desired)?;

    let status = if changes.is_empty() {
        RunStatus::UpToDate
    } else if dry_run {
        RunStatus::DryRun
    } else if confirm(&changes)? {
        RunStatus::Applied
    } else {
        RunStatus::Declined
    };

    let applied = if status == RunStatus::Applied {
        apply(store, &changes)?
    } else {
        tracing::info!("no changes written ({status:?})");
        Vec::new()
    };

    Ok(RunReport {
        changes,
        status,
        applied,
    })
}
