//! alertsync core library: spec types and config loading.
//!
//! - [`types`]: [`QuerySpec`], [`SuppressionSpec`] and the [`Spec`] trait
//! - [`loader`]: HCL config files → ordered spec sequences
//! - [`error`]: [`LoadError`]

pub mod error;
pub mod loader;
pub mod types;

pub use error::LoadError;
pub use types::{Guid, QuerySpec, Spec, SpecKind, SuppressionSpec};
