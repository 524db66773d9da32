//! `alertsync suppression`: sync every `*.qs` file below a directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use alertsync_core::{loader, SuppressionSpec};
use alertsync_store::StoreConfig;

/// Arguments for `alertsync suppression`.
#[derive(Args, Debug)]
pub struct SuppressionArgs {
    /// Directory to scan (default: the directory holding the executable).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Print the proposed changes without prompting or writing.
    #[arg(long)]
    pub dry_run: bool,
}

impl SuppressionArgs {
    pub fn run(self) -> Result<()> {
        let dir = match self.dir {
            Some(dir) => dir,
            None => loader::executable_dir().context("could not locate the executable")?,
        };
        let specs: Vec<SuppressionSpec> = loader::load_dir(&dir).with_context(|| {
            format!("failed to load suppression specs under '{}'", dir.display())
        })?;
        let config = StoreConfig::from_env(None).context("store settings are incomplete")?;
        super::sync_specs(&specs, config, self.dry_run)
    }
}
