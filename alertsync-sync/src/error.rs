//! Error types for alertsync-sync.

use thiserror::Error;

use alertsync_core::Guid;
use alertsync_store::StoreError;

use crate::writer::Operation;

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading the current state from the store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A write failed part-way through a batch.
    ///
    /// The `applied` operations before it stay in effect; nothing is rolled back.
    #[error("{operation} of {guid} failed after {applied} applied change(s): {source}")]
    Apply {
        operation: Operation,
        guid: Guid,
        applied: usize,
        #[source]
        source: StoreError,
    },

    /// The confirmation gate could not read an answer.
    #[error("failed to read confirmation: {0}")]
    Confirm(#[source] std::io::Error),
}
