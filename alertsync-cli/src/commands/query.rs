//! `alertsync query`: sync `query_spec` blocks from one config file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use alertsync_core::{loader, QuerySpec};
use alertsync_store::StoreConfig;

/// Arguments for `alertsync query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Snowflake user the statements run as.
    pub username: String,

    /// Config file holding `query_spec` blocks.
    pub config_file: PathBuf,

    /// Print the proposed changes without prompting or writing.
    #[arg(long)]
    pub dry_run: bool,
}

impl QueryArgs {
    pub fn run(self) -> Result<()> {
        let specs: Vec<QuerySpec> = loader::load_file(&self.config_file).with_context(|| {
            format!(
                "failed to load query specs from '{}'",
                self.config_file.display()
            )
        })?;
        let config = StoreConfig::from_env(Some(&self.username))
            .context("store settings are incomplete")?;
        super::sync_specs(&specs, config, self.dry_run)
    }
}
