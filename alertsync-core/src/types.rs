//! Domain types for alertsync.
//!
//! Both spec kinds serialize with the field names already stored in the
//! remote tables (`GUID`, `Query`, `AffectedEnv`, …), so a payload written
//! by this crate reads back as the same record.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity of a spec record. Names may change; the GUID does not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Guid(pub String);

impl Guid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// SpecKind
// ---------------------------------------------------------------------------

/// Which of the two spec tables a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecKind {
    Query,
    Suppression,
}

impl SpecKind {
    pub fn all() -> &'static [SpecKind] {
        &[SpecKind::Query, SpecKind::Suppression]
    }

    /// HCL block identifier in config files.
    pub fn block_identifier(self) -> &'static str {
        match self {
            SpecKind::Query => "query_spec",
            SpecKind::Suppression => "suppression_spec",
        }
    }

    /// Unqualified table name in the store.
    pub fn table(self) -> &'static str {
        match self {
            SpecKind::Query => "snowalert_queries",
            SpecKind::Suppression => "suppression_queries",
        }
    }

    /// The single VARIANT column holding the serialized record.
    pub fn column(self) -> &'static str {
        match self {
            SpecKind::Query => "query_spec",
            SpecKind::Suppression => "suppression_spec",
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecKind::Query => write!(f, "query"),
            SpecKind::Suppression => write!(f, "suppression"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spec trait
// ---------------------------------------------------------------------------

/// Behaviour shared by every reconcilable spec record.
///
/// Equality is structural (`PartialEq` derive): list order matters and an
/// absent attribute differs from an empty one.
pub trait Spec: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    const KIND: SpecKind;

    /// JSON/HCL key the block label is stored under.
    const NAME_FIELD: &'static str;

    /// Every attribute a config block may set (the name field excluded).
    const ATTRIBUTES: &'static [&'static str];

    fn guid(&self) -> &Guid;

    fn name(&self) -> &str;

    fn query(&self) -> &str;

    fn query_mut(&mut self) -> &mut String;

    /// Collapse the free-text query onto one line.
    fn normalize(&mut self) {
        let query = self.query_mut();
        if query.contains('\n') {
            *query = query.replace('\n', " ");
        }
    }
}

// ---------------------------------------------------------------------------
// Query spec
// ---------------------------------------------------------------------------

/// An alert query definition.
///
/// The classification attributes are loosely typed lists. By convention the
/// first element is a format string and the rest are result-column indices
/// feeding it, e.g. `AffectedObject = ["{0} on {1}", 2, 3]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuerySpec {
    #[serde(rename = "QueryName")]
    pub name: String,
    #[serde(rename = "GUID")]
    pub guid: Guid,
    pub query: String,
    #[serde(default)]
    pub affected_env: Option<Vec<Value>>,
    #[serde(default)]
    pub affected_object_type: Option<Vec<Value>>,
    #[serde(default)]
    pub alert_type: Option<Vec<Value>>,
    #[serde(default)]
    pub severity: Option<Vec<Value>>,
    #[serde(default)]
    pub detector: Option<Vec<Value>>,
    #[serde(default)]
    pub affected_object: Option<Vec<Value>>,
    #[serde(default)]
    pub event_time: Option<Vec<Value>>,
    #[serde(default)]
    pub description: Option<Vec<Value>>,
    #[serde(default)]
    pub event_data: Option<Vec<Value>>,
}

impl QuerySpec {
    /// A query spec with no classification attributes set.
    pub fn new(name: impl Into<String>, guid: impl Into<Guid>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
            query: query.into(),
            affected_env: None,
            affected_object_type: None,
            alert_type: None,
            severity: None,
            detector: None,
            affected_object: None,
            event_time: None,
            description: None,
            event_data: None,
        }
    }
}

impl Spec for QuerySpec {
    const KIND: SpecKind = SpecKind::Query;
    const NAME_FIELD: &'static str = "QueryName";
    const ATTRIBUTES: &'static [&'static str] = &[
        "GUID",
        "Query",
        "AffectedEnv",
        "AffectedObjectType",
        "AlertType",
        "Severity",
        "Detector",
        "AffectedObject",
        "EventTime",
        "Description",
        "EventData",
    ];

    fn guid(&self) -> &Guid {
        &self.guid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }
}

// ---------------------------------------------------------------------------
// Suppression spec
// ---------------------------------------------------------------------------

/// A suppression rule: a query whose matches mark alerts as suppressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SuppressionSpec {
    #[serde(rename = "SuppressionName")]
    pub name: String,
    #[serde(rename = "GUID")]
    pub guid: Guid,
    pub query: String,
}

impl SuppressionSpec {
    pub fn new(name: impl Into<String>, guid: impl Into<Guid>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
            query: query.into(),
        }
    }
}

impl Spec for SuppressionSpec {
    const KIND: SpecKind = SpecKind::Suppression;
    const NAME_FIELD: &'static str = "SuppressionName";
    const ATTRIBUTES: &'static [&'static str] = &["GUID", "Query"];

    fn guid(&self) -> &Guid {
        &self.guid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
