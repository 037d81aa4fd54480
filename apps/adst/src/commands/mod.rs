//! Command modules for the adst CLI.
//!
//! ## Acquisition
//!
//! - [`download`] - Acquire a build
//! - [`run`] - Launch an extension test suite
//! - [`versions`] - List published versions
//!
//! ## Local
//!
//! - [`cli_path`] - Resolve the bundled command-line launcher
//! - [`cache`] - List or clean cached builds
//! - [`runner_options`] - Mocha options from the environment

pub mod cache;
pub mod cli_path;
pub mod download;
pub mod run;
pub mod runner_options;
pub mod versions;

use std::path::PathBuf;

use anyhow::{Context, Result};
use azdata_test::Settings;

/// Flags shared by every subcommand.
#[derive(Debug, Default)]
pub struct GlobalArgs {
    pub cache_dir: Option<PathBuf>,
    pub update_server: Option<String>,
}

impl GlobalArgs {
    /// Builds settings from the environment, then applies command-line overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::from_env().context("Failed to read settings")?;
        if let Some(dir) = &self.cache_dir {
            settings = settings.cache_root(dir);
        }
        if let Some(server) = &self.update_server {
            settings = settings.update_server(server);
        }
        tracing::debug!(
            server = %settings.update_server,
            cache = %settings.cache_root.display(),
            "Settings"
        );
        Ok(settings)
    }
}
