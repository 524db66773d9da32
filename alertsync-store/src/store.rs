//! The store seam.

use alertsync_core::{Guid, SpecKind};

use crate::error::StoreError;

/// A table-per-kind store of JSON payloads, addressed by the payload's `GUID`.
///
/// Implementations issue exactly one statement per call and never batch;
/// callers rely on that for their stop-at-first-failure semantics.
pub trait SpecStore {
    /// Every stored payload for `kind`, in store order.
    fn fetch_payloads(&mut self, kind: SpecKind) -> Result<Vec<String>, StoreError>;

    /// Store `payload` as a new row.
    fn insert_payload(&mut self, kind: SpecKind, payload: &str) -> Result<(), StoreError>;

    /// Delete every row whose payload `GUID` equals `guid`. Returns rows affected.
    fn delete_by_guid(&mut self, kind: SpecKind, guid: &Guid) -> Result<u64, StoreError>;

    /// Replace the payload of every row whose `GUID` equals `guid`. Returns rows affected.
    fn update_by_guid(
        &mut self,
        kind: SpecKind,
        guid: &Guid,
        payload: &str,
    ) -> Result<u64, StoreError>;

    /// Create the table for `kind` if it does not exist yet.
    fn create_table(&mut self, kind: SpecKind) -> Result<(), StoreError>;
}
