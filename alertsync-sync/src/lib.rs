//! # alertsync-sync
//!
//! Reconciliation and apply.
//!
//! [`reconcile`] compares the specs loaded from config against those read
//! from a store and produces a [`ChangeSet`]; [`apply`] writes a change set
//! back. [`pipeline::run`] strings both together behind a confirmation gate.

pub mod confirm;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod writer;

pub use error::SyncError;
pub use reconcile::{reconcile, ChangeSet, DuplicateGuid, Modified, Side};
pub use writer::{apply, ApplyResult, Operation};
