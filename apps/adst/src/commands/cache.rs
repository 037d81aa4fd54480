//! Cache command for the adst CLI.
//!
//! ## Usage
//!
//! ```bash
//! adst cache list
//! adst cache clean
//! ```

use anyhow::{Context, Result};
use azdata_test::CacheStore;
use clap::{Args, Subcommand};

use super::GlobalArgs;

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// List cached builds.
    List,
    /// Remove every cached build.
    Clean,
}

/// Executes the cache command.
///
/// # Errors
///
/// Returns an error if the cache directory cannot be read or an entry cannot
/// be removed.
pub async fn execute(globals: &GlobalArgs, args: &CacheArgs) -> Result<()> {
    let settings = globals.settings()?;
    let cache = CacheStore::new(settings.cache_root);

    match args.action {
        CacheAction::List => {
            let entries = cache.entries().context("Failed to list cache")?;
            if entries.is_empty() {
                println!("No cached builds in {}", cache.root().display());
                return Ok(());
            }
            println!("Cached builds in {}:", cache.root().display());
            println!();
            for version in entries {
                println!("  {version}");
            }
        }
        CacheAction::Clean => {
            let removed = cache.clean().await.context("Failed to clean cache")?;
            println!("Removed {removed} cached build(s) from {}", cache.root().display());
        }
    }
    Ok(())
}
