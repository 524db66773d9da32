//! In-process [`SpecStore`] with the same row semantics as the SQL tables.

use std::collections::HashMap;

use alertsync_core::{Guid, SpecKind};

use crate::codec::payload_guid;
use crate::error::StoreError;
use crate::store::SpecStore;

/// Rows held in memory, one `Vec` of payloads per kind.
///
/// Tables spring into existence on first insert. Delete and update match on
/// the payload's `GUID` field and touch every matching row, like the SQL
/// statements they stand in for.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<SpecKind, Vec<String>>,
    mutations: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with raw payload rows for `kind`.
    pub fn with_rows(kind: SpecKind, rows: impl IntoIterator<Item = String>) -> Self {
        let mut store = Self::new();
        store.tables.insert(kind, rows.into_iter().collect());
        store
    }

    /// Current rows for `kind`.
    pub fn rows(&self, kind: SpecKind) -> &[String] {
        self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of insert/delete/update calls made so far.
    pub fn mutations(&self) -> usize {
        self.mutations
    }
}

impl SpecStore for MemoryStore {
    fn fetch_payloads(&mut self, kind: SpecKind) -> Result<Vec<String>, StoreError> {
        Ok(self.rows(kind).to_vec())
    }

    fn insert_payload(&mut self, kind: SpecKind, payload: &str) -> Result<(), StoreError> {
        self.mutations += 1;
        self.tables
            .entry(kind)
            .or_default()
            .push(payload.to_owned());
        Ok(())
    }

    fn delete_by_guid(&mut self, kind: SpecKind, guid: &Guid) -> Result<u64, StoreError> {
        self.mutations += 1;
        let Some(rows) = self.tables.get_mut(&kind) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| payload_guid(row).as_ref() != Some(guid));
        Ok((before - rows.len()) as u64)
    }

    fn update_by_guid(
        &mut self,
        kind: SpecKind,
        guid: &Guid,
        payload: &str,
    ) -> Result<u64, StoreError> {
        self.mutations += 1;
        let mut affected = 0;
        if let Some(rows) = self.tables.get_mut(&kind) {
            for row in rows.iter_mut() {
                if payload_guid(row).as_ref() == Some(guid) {
                    *row = payload.to_owned();
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    fn create_table(&mut self, kind: SpecKind) -> Result<(), StoreError> {
        self.tables.entry(kind).or_default();
        Ok(())
    }
}
