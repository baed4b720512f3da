//! `notesync init <vault>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use notesync_core::config::{self, TOKEN_ENV};

/// Create the config file for a vault.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to the notes vault (the directory holding the mapped folders).
    pub vault: PathBuf,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let vault = self
            .vault
            .canonicalize()
            .with_context(|| format!("cannot resolve vault path '{}'", self.vault.display()))?;

        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let existed = config::config_path_at(&home).exists();
        let cfg = config::init_at(&home, vault)
            .context("failed to write ~/.notesync/config.yaml")?;

        if existed {
            println!("· Config already exists (vault: {})", cfg.vault.display());
        } else {
            println!("✓ Vault set to {}", cfg.vault.display());
            println!("  Saved to: ~/.notesync/config.yaml");
        }
        println!("  Next: `notesync collections add <folder> <database-id>`");
        if std::env::var_os(TOKEN_ENV).is_none() {
            println!("  Set {TOKEN_ENV} before running `notesync sync`.");
        }
        Ok(())
    }
}
