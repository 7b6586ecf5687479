//! `stockroom init [--database <path>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stockroom_core::config;
use stockroom_session::init_tracing;
use stockroom_store::SqliteStore;

/// Write `~/.stockroom/config.yaml` and create the database schema.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Database file. Relative paths resolve against ~/.stockroom/.
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let config = config::init(self.database).context("failed to write config")?;
        init_tracing(&config.log_filter);

        let path = config.database_path_at(&home);
        SqliteStore::open(&path)
            .with_context(|| format!("cannot create database '{}'", path.display()))?;

        println!("✓ Initialized stockroom");
        println!("  Config:   {}", config::config_path_at(&home).display());
        println!("  Database: {}", path.display());
        Ok(())
    }
}
