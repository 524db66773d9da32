//! `alertsync init-tables`: create the spec tables when missing.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use alertsync_core::SpecKind;
use alertsync_store::{SnowflakeStore, SpecStore, StoreConfig};

/// Arguments for `alertsync init-tables`.
#[derive(Args, Debug)]
pub struct InitTablesArgs {
    /// Snowflake user (default: `UPDATE_USER`).
    #[arg(long)]
    pub user: Option<String>,
}

impl InitTablesArgs {
    pub fn run(self) -> Result<()> {
        let config = StoreConfig::from_env(self.user.as_deref())
            .context("store settings are incomplete")?;
        let tables: Vec<(SpecKind, String)> = SpecKind::all()
            .iter()
            .map(|kind| (*kind, config.qualified_table(*kind)))
            .collect();

        let mut store = SnowflakeStore::new(config);
        for (kind, table) in tables {
            store
                .create_table(kind)
                .with_context(|| format!("failed to create {table}"))?;
            println!("{} {table} ({} specs)", "✓".green().bold(), kind);
        }
        Ok(())
    }
}
