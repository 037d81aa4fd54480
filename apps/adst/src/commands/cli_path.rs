//! cli-path command for the adst CLI.
//!
//! Resolves the launcher used for extension management, e.g.
//! `$(adst cli-path "$EXE") --install-extension my.vsix`.

use std::path::PathBuf;

use anyhow::Result;
use azdata_test::{Platform, cli_path};
use clap::Args;

/// Arguments for the cli-path command.
#[derive(Args)]
pub struct CliPathArgs {
    /// Executable path, as printed by `adst download`.
    pub executable: PathBuf,

    /// Platform the executable belongs to. Defaults to the host.
    #[arg(long, short = 'p')]
    pub platform: Option<Platform>,
}

/// Executes the cli-path command. Works offline; the path is not checked.
#[allow(clippy::unnecessary_wraps)]
pub fn execute(args: &CliPathArgs) -> Result<()> {
    let platform = args.platform.unwrap_or_else(Platform::host);
    println!("{}", cli_path(&args.executable, platform).display());
    Ok(())
}
