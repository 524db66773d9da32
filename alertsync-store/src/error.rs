//! Error types for alertsync-store.

use thiserror::Error;

/// Errors raised while validating store configuration at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("environment variable {0} must be set and non-empty")]
    Missing(&'static str),

    /// `SNOWALERT_TOKEN_TYPE` holds an unsupported value.
    #[error("unsupported token type '{0}'; expected OAUTH or KEYPAIR_JWT")]
    InvalidTokenType(String),
}

/// All errors that can arise from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection-level failure (DNS, TLS, refused, …).
    #[error("store request failed: {0}")]
    Request(#[source] Box<ureq::Error>),

    /// The store answered with an error status.
    #[error("store returned HTTP {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body could not be read or decoded.
    #[error("unreadable store response: {0}")]
    Response(#[source] std::io::Error),

    /// An asynchronous statement came back without a handle to poll.
    #[error("store accepted statement but returned no statement handle")]
    MissingHandle,

    /// A row had no payload in its single column.
    #[error("row {row} has no payload")]
    EmptyRow { row: usize },

    /// A row's payload is not a valid spec record.
    #[error("row {row} payload could not be decoded: {source}")]
    Decode {
        row: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A spec could not be encoded to JSON.
    #[error("failed to encode spec: {0}")]
    Encode(#[from] serde_json::Error),
}
