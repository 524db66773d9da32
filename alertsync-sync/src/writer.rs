//! Apply a [`ChangeSet`] to a store.
//!
//! ## Order
//!
//! 1. Every added record → insert.
//! 2. Every removed record → delete by GUID.
//! 3. Every modified record → overwrite by GUID with the full payload.
//!
//! One statement per record. The first failure stops the batch and is
//! returned as [`SyncError::Apply`]; statements already executed are not
//! rolled back.

use std::fmt;

use alertsync_core::{Guid, Spec};
use alertsync_store::{records, SpecStore};

use crate::error::SyncError;
use crate::reconcile::ChangeSet;

// ---------------------------------------------------------------------------
// Apply result
// ---------------------------------------------------------------------------

/// Kind of store statement issued for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Modify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => write!(f, "add"),
            Operation::Remove => write!(f, "remove"),
            Operation::Modify => write!(f, "modify"),
        }
    }
}

/// Outcome of one applied record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// Row inserted.
    Added { guid: Guid },
    /// Delete executed; `rows` rows matched the GUID.
    Removed { guid: Guid, rows: u64 },
    /// Update executed; `rows` rows matched the GUID.
    Modified { guid: Guid, rows: u64 },
}

impl ApplyResult {
    pub fn guid(&self) -> &Guid {
        match self {
            ApplyResult::Added { guid }
            | ApplyResult::Removed { guid, .. }
            | ApplyResult::Modified { guid, .. } => guid,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ApplyResult::Added { .. } => Operation::Add,
            ApplyResult::Removed { .. } => Operation::Remove,
            ApplyResult::Modified { .. } => Operation::Modify,
        }
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Write `changes` to `store` in add → remove → modify order.
pub fn apply<S: Spec>(
    store: &mut impl SpecStore,
    changes: &ChangeSet<S>,
) -> Result<Vec<ApplyResult>, SyncError> {
    let mut results = Vec::with_capacity(changes.len());

    for spec in &changes.added {
        records::add_spec(store, spec).map_err(|e| failed(Operation::Add, spec, &results, e))?;
        tracing::info!("added {} {} ({})", S::KIND, spec.guid(), spec.name());
        results.push(ApplyResult::Added {
            guid: spec.guid().clone(),
        });
    }

    for spec in &changes.removed {
        let rows = records::remove_spec(store, spec)
            .map_err(|e| failed(Operation::Remove, spec, &results, e))?;
        if rows == 0 {
            tracing::warn!("remove {} {}: no rows matched", S::KIND, spec.guid());
        } else {
            tracing::info!("removed {} {} ({})", S::KIND, spec.guid(), spec.name());
        }
        results.push(ApplyResult::Removed {
            guid: spec.guid().clone(),
            rows,
        });
    }

    for modified in &changes.modified {
        let spec = &modified.spec;
        let rows = records::update_spec(store, spec)
            .map_err(|e| failed(Operation::Modify, spec, &results, e))?;
        if rows == 0 {
            tracing::warn!("modify {} {}: no rows matched", S::KIND, spec.guid());
        } else {
            tracing::info!("modified {} {} ({})", S::KIND, spec.guid(), spec.name());
        }
        results.push(ApplyResult::Modified {
            guid: spec.guid().clone(),
            rows,
        });
    }

    Ok(results)
}

fn failed<S: Spec>(
    operation: Operation,
    spec: &S,
    applied: &[ApplyResult],
    source: alertsync_store::StoreError,
) -> SyncError {
    tracing::error!(
        "{operation} of {} failed after {} applied change(s); earlier changes remain in the store",
        spec.guid(),
        applied.len()
    );
    SyncError::Apply {
        operation,
        guid: spec.guid().clone(),
        applied: applied.len(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
