//! Error types for alertsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading spec config files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O failure, with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid HCL.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: hcl::Error,
    },

    /// An attribute expression could not be evaluated to a value.
    #[error("{path}: cannot evaluate `{attribute}` in block \"{name}\": {source}")]
    Eval {
        path: PathBuf,
        name: String,
        attribute: String,
        #[source]
        source: hcl::eval::Error,
    },

    /// A top-level structure other than the expected spec block.
    #[error("{path}: unexpected `{found}` at top level; expected `{expected}` blocks")]
    UnexpectedStructure {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },

    /// A spec block must carry exactly one label: its name.
    #[error("{path}: `{block}` block must have exactly one label, found {count}")]
    BadLabels {
        path: PathBuf,
        block: &'static str,
        count: usize,
    },

    /// An attribute that the spec kind does not define.
    #[error("{path}: unknown attribute `{attribute}` in block \"{name}\"")]
    UnknownAttribute {
        path: PathBuf,
        name: String,
        attribute: String,
    },

    /// The block's attributes do not form a valid spec (missing GUID, wrong types, …).
    #[error("{path}: invalid spec \"{name}\": {source}")]
    Invalid {
        path: PathBuf,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A directory scan produced no spec records at all.
    #[error("no .{extension} config files with specs found under {dir}; run from the folder holding your config files or pass --dir")]
    NoConfigFiles { dir: PathBuf, extension: &'static str },
}

/// Convenience constructor for [`LoadError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.into(),
        source,
    }
}
