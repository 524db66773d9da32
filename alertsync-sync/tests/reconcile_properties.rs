//! Set-level properties of `reconcile`, checked over a table of inputs.

use std::collections::BTreeSet;
use std::io::{self, Cursor};

use rstest::rstest;
use serde_json::json;

use alertsync_core::{Guid, QuerySpec, Spec, SpecKind, SuppressionSpec};
use alertsync_store::{records, MemoryStore};
use alertsync_sync::pipeline::{self, RunStatus};
use alertsync_sync::{apply, confirm, reconcile, SyncError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn q(guid: &str, name: &str, query: &str) -> QuerySpec {
    QuerySpec::new(name, guid, query)
}

fn q_with_severity(guid: &str, severity: i64) -> QuerySpec {
    let mut spec = q(guid, "Sev", "select 1");
    spec.severity = Some(vec![json!(severity)]);
    spec
}

fn keys<S: Spec>(specs: &[S]) -> BTreeSet<Guid> {
    specs.iter().map(|s| s.guid().clone()).collect()
}

fn empty() -> Vec<QuerySpec> {
    vec![]
}

fn disjoint() -> (Vec<QuerySpec>, Vec<QuerySpec>) {
    (
        vec![q("a", "A", "select a"), q("b", "B", "select b")],
        vec![q("c", "C", "select c")],
    )
}

fn overlapping() -> (Vec<QuerySpec>, Vec<QuerySpec>) {
    (
        vec![q("a", "A", "select a"), q("b", "B", "select b"), q_with_severity("s", 3)],
        vec![q("b", "B", "select b2"), q("c", "C", "select c"), q_with_severity("s", 3)],
    )
}

fn renamed() -> (Vec<QuerySpec>, Vec<QuerySpec>) {
    (vec![q("r", "New", "select r")], vec![q("r", "Old", "select r")])
}

fn duplicates() -> (Vec<QuerySpec>, Vec<QuerySpec>) {
    (
        vec![q("d", "first", "select 1"), q("d", "second", "select 2")],
        vec![q("d", "stored", "select 2"), q("e", "E", "select e")],
    )
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[rstest]
#[case::both_empty((empty(), empty()))]
#[case::disjoint(disjoint())]
#[case::overlapping(overlapping())]
#[case::renamed(renamed())]
#[case::duplicates(duplicates())]
fn added_keys_are_absent_from_store(#[case] input: (Vec<QuerySpec>, Vec<QuerySpec>)) {
    let (desired, actual) = input;
    let changes = reconcile(&desired, &actual);
    assert!(keys(&changes.added).is_disjoint(&keys(&actual)));
    assert!(keys(&changes.removed).is_disjoint(&keys(&desired)));
}

#[rstest]
#[case::disjoint(disjoint())]
#[case::overlapping(overlapping())]
#[case::renamed(renamed())]
#[case::duplicates(duplicates())]
fn removed_mirrors_added_when_swapped(#[case] input: (Vec<QuerySpec>, Vec<QuerySpec>)) {
    let (a, b) = input;
    let forward = reconcile(&a, &b);
    let backward = reconcile(&b, &a);
    assert_eq!(keys(&forward.removed), keys(&backward.added));
    assert_eq!(keys(&forward.added), keys(&backward.removed));
}

#[rstest]
#[case::disjoint(disjoint())]
#[case::overlapping(overlapping())]
fn identical_records_never_appear(#[case] input: (Vec<QuerySpec>, Vec<QuerySpec>)) {
    let (desired, actual) = input;
    let changes = reconcile(&desired, &actual);
    let shared: Vec<_> = desired.iter().filter(|d| actual.contains(d)).collect();
    for spec in shared {
        assert!(!changes.added.contains(spec));
        assert!(!changes.removed.contains(spec));
        assert!(!changes.modified.iter().any(|m| m.spec == *spec));
    }
}

#[rstest]
#[case::both_empty((empty(), empty()))]
#[case::disjoint(disjoint())]
#[case::overlapping(overlapping())]
#[case::renamed(renamed())]
#[case::duplicates(duplicates())]
fn apply_then_reread_is_idempotent(#[case] input: (Vec<QuerySpec>, Vec<QuerySpec>)) {
    let (desired, actual) = input;
    let mut store = MemoryStore::new();
    for spec in &actual {
        records::add_spec(&mut store, spec).unwrap();
    }

    let current: Vec<QuerySpec> = records::read_specs(&mut store).unwrap();
    let changes = reconcile(&desired, &current);
    apply(&mut store, &changes).unwrap();

    let reread: Vec<QuerySpec> = records::read_specs(&mut store).unwrap();
    let again = reconcile(&desired, &reread);
    assert!(again.is_empty(), "second pass should be empty: {again:?}");
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn overlapping_scenario_sets() {
    let (desired, actual) = overlapping();
    let changes = reconcile(&desired, &actual);
    assert_eq!(keys(&changes.added), BTreeSet::from([Guid::from("a")]));
    assert_eq!(keys(&changes.removed), BTreeSet::from([Guid::from("c")]));
    assert_eq!(changes.modified.len(), 1);
    assert_eq!(changes.modified[0].spec, q("b", "B", "select b"));
}

/// Run the pipeline with `input` fed to the real confirmation prompt.
fn run_with_answer(store: &mut MemoryStore, input: &str) -> RunStatus {
    let desired = vec![SuppressionSpec::new("S", "s-1", "select 1")];
    let mut input = Cursor::new(input.to_owned());
    pipeline::run(store, &desired, false, |_| {
        confirm::read_confirmation(&mut input, &mut io::sink()).map_err(SyncError::Confirm)
    })
    .unwrap()
    .status
}

#[rstest]
#[case::lowercase_y("y\n")]
#[case::capitalised("Yes\n")]
#[case::blank_line("\n")]
#[case::closed_input("")]
#[case::padded(" yes\n")]
#[case::trailing_space("yes \n")]
#[case::shouted("YES\n")]
fn only_exact_yes_mutates(#[case] input: &str) {
    let mut store = MemoryStore::new();
    assert_eq!(run_with_answer(&mut store, input), RunStatus::Declined);
    assert_eq!(store.mutations(), 0);
}

#[rstest]
#[case::unix("yes\n")]
#[case::windows("yes\r\n")]
#[case::no_newline("yes")]
fn exact_yes_applies(#[case] input: &str) {
    let mut store = MemoryStore::new();
    assert_eq!(run_with_answer(&mut store, input), RunStatus::Applied);
    assert_eq!(store.rows(SpecKind::Suppression).len(), 1);
}
