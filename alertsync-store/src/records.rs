//! Typed record operations on any [`SpecStore`].

use alertsync_core::Spec;

use crate::codec;
use crate::error::StoreError;
use crate::store::SpecStore;

/// Read every stored record of kind `S`.
///
/// A single undecodable row fails the whole read; no partial result is
/// returned.
pub fn read_specs<S: Spec>(store: &mut impl SpecStore) -> Result<Vec<S>, StoreError> {
    let payloads = store.fetch_payloads(S::KIND)?;
    let specs = payloads
        .iter()
        .enumerate()
        .map(|(row, payload)| {
            codec::decode::<S>(payload).map_err(|source| StoreError::Decode { row, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("read {} {} specs from store", specs.len(), S::KIND);
    Ok(specs)
}

/// Insert `spec` as a new row.
pub fn add_spec<S: Spec>(store: &mut impl SpecStore, spec: &S) -> Result<(), StoreError> {
    let payload = codec::encode(spec)?;
    store.insert_payload(S::KIND, &payload)
}

/// Delete the row(s) carrying `spec`'s GUID.
pub fn remove_spec<S: Spec>(store: &mut impl SpecStore, spec: &S) -> Result<u64, StoreError> {
    store.delete_by_guid(S::KIND, spec.guid())
}

/// Overwrite the row(s) carrying `spec`'s GUID with its full payload.
pub fn update_spec<S: Spec>(store: &mut impl SpecStore, spec: &S) -> Result<u64, StoreError> {
    let payload = codec::encode(spec)?;
    store.update_by_guid(S::KIND, spec.guid(), &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use alertsync_core::{QuerySpec, SpecKind, SuppressionSpec};

    #[test]
    fn add_then_read_roundtrips() {
        let mut store = MemoryStore::new();
        let spec = QuerySpec::new("Q", "g", "select 1");
        add_spec(&mut store, &spec).unwrap();
        let read: Vec<QuerySpec> = read_specs(&mut store).unwrap();
        assert_eq!(read, vec![spec]);
    }

    #[test]
    fn update_rewrites_whole_payload() {
        let mut store = MemoryStore::new();
        add_spec(&mut store, &SuppressionSpec::new("Old", "g", "select 1")).unwrap();
        let renamed = SuppressionSpec::new("New", "g", "select 2");
        assert_eq!(update_spec(&mut store, &renamed).unwrap(), 1);
        let read: Vec<SuppressionSpec> = read_specs(&mut store).unwrap();
        assert_eq!(read, vec![renamed]);
    }

    #[test]
    fn remove_deletes_by_guid() {
        let mut store = MemoryStore::new();
        let spec = SuppressionSpec::new("S", "g", "select 1");
        add_spec(&mut store, &spec).unwrap();
        assert_eq!(remove_spec(&mut store, &spec).unwrap(), 1);
        assert!(store.rows(SpecKind::Suppression).is_empty());
    }

    #[test]
    fn one_bad_row_fails_the_read() {
        let mut store = MemoryStore::with_rows(
            SpecKind::Suppression,
            [
                r#"{"SuppressionName":"a","GUID":"a","Query":"q"}"#.to_string(),
                r#"{"SuppressionName":"b","GUID":"b"}"#.to_string(),
            ],
        );
        let err = read_specs::<SuppressionSpec>(&mut store).unwrap_err();
        assert!(matches!(err, StoreError::Decode { row: 1, .. }));
    }
}
