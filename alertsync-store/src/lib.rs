//! # alertsync-store
//!
//! The remote side of a sync: a [`SpecStore`] holds one JSON payload per
//! spec record, looked up by the payload's `GUID` field.
//!
//! - [`SnowflakeStore`]: Snowflake SQL API over a single HTTP connection
//! - [`MemoryStore`]: in-process store with the same row semantics
//! - [`records`]: typed read/insert/delete/update on top of any store

pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
pub mod records;
pub mod snowflake;
pub mod store;

pub use config::{StoreConfig, TokenType};
pub use error::{ConfigError, StoreError};
pub use memory::MemoryStore;
pub use snowflake::SnowflakeStore;
pub use store::SpecStore;
