//! Config-vs-store reconciliation.
//!
//! 1. Key both sides by GUID (later duplicates replace earlier ones and are
//!    reported in [`ChangeSet::duplicates`]).
//! 2. Added = config keys missing from the store.
//! 3. Removed = store keys missing from config.
//! 4. Modified = keys on both sides whose records are not structurally
//!    equal; the config record is the target and a unified diff from the
//!    stored record is attached.
//!
//! Output is in GUID order as a side effect of the sorted maps; nothing
//! downstream depends on that.

use std::collections::BTreeMap;
use std::fmt;

use similar::TextDiff;

use alertsync_core::{Guid, Spec};

/// Which input a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Config,
    Store,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Config => write!(f, "config"),
            Side::Store => write!(f, "store"),
        }
    }
}

/// A GUID seen more than once on one side. The last occurrence was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGuid {
    pub guid: Guid,
    pub side: Side,
}

/// A record present on both sides with different content.
#[derive(Debug, Clone, PartialEq)]
pub struct Modified<S> {
    /// The config-side record, to be written over the stored one.
    pub spec: S,
    /// Unified diff, stored record → config record.
    pub diff: String,
}

/// The three change sets produced by [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<S> {
    pub added: Vec<S>,
    pub removed: Vec<S>,
    pub modified: Vec<Modified<S>>,
    pub duplicates: Vec<DuplicateGuid>,
}

impl<S> Default for ChangeSet<S> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            modified: Vec::new(),
            duplicates: Vec::new(),
        }
    }
}

impl<S> ChangeSet<S> {
    /// True when applying would not touch the store.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Number of store operations applying would issue.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

/// Compare `desired` (config) with `actual` (store).
pub fn reconcile<S: Spec>(desired: &[S], actual: &[S]) -> ChangeSet<S> {
    let mut duplicates = Vec::new();
    let desired_map = keyed(desired, Side::Config, &mut duplicates);
    let actual_map = keyed(actual, Side::Store, &mut duplicates);

    let mut changes = ChangeSet {
        duplicates,
        ..ChangeSet::default()
    };

    for (guid, spec) in &desired_map {
        match actual_map.get(guid) {
            None => changes.added.push((*spec).clone()),
            Some(current) if *current != *spec => {
                let diff = spec_diff(*current, *spec);
                tracing::debug!("{} {guid} modified:\n{diff}", S::KIND);
                changes.modified.push(Modified {
                    spec: (*spec).clone(),
                    diff,
                });
            }
            Some(_) => {}
        }
    }
    for (guid, spec) in &actual_map {
        if !desired_map.contains_key(guid) {
            changes.removed.push((*spec).clone());
        }
    }

    tracing::info!(
        added = changes.added.len(),
        removed = changes.removed.len(),
        modified = changes.modified.len(),
        "reconciled {} specs",
        S::KIND
    );
    changes
}

fn keyed<'a, S: Spec>(
    specs: &'a [S],
    side: Side,
    duplicates: &mut Vec<DuplicateGuid>,
) -> BTreeMap<&'a Guid, &'a S> {
    let mut map = BTreeMap::new();
    for spec in specs {
        if map.insert(spec.guid(), spec).is_some() {
            tracing::warn!(
                "duplicate GUID {} in {side}; keeping the last one (\"{}\")",
                spec.guid(),
                spec.name()
            );
            duplicates.push(DuplicateGuid {
                guid: spec.guid().clone(),
                side,
            });
        }
    }
    map
}

/// Unified diff between the pretty-printed JSON of two records.
pub fn spec_diff<S: Spec>(actual: &S, desired: &S) -> String {
    let old = pretty(actual);
    let new = pretty(desired);
    let old_header = format!("store/{}", actual.guid());
    let new_header = format!("config/{}", desired.guid());
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

fn pretty<S: Spec>(spec: &S) -> String {
    match serde_json::to_string_pretty(spec) {
        Ok(mut json) => {
            json.push('\n');
            json
        }
        Err(err) => format!("<unprintable spec: {err}>\n"),
    }
}
