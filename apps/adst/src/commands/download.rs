//! Download command for the adst CLI.
//!
//! ## Usage
//!
//! ```bash
//! adst download                      # Latest stable
//! adst download --version 1.32.0     # Specific release
//! adst download --version insiders   # Latest Insiders build
//! ```
//!
//! Prints the executable path on stdout so scripts can capture it.

use anyhow::Result;
use azdata_test::{Platform, Provisioner, VersionRequest};
use clap::Args;

use super::GlobalArgs;

/// Arguments for the download command.
#[derive(Args)]
pub struct DownloadArgs {
    /// Version to download: `stable`, `insiders`, or a release such as `1.32.0`.
    #[arg(long, default_value = "stable")]
    pub version: VersionRequest,

    /// Target platform (win32-x64-archive, darwin, linux-x64). Defaults to the host.
    #[arg(long, short = 'p')]
    pub platform: Option<Platform>,
}

/// Executes the download command.
///
/// # Errors
///
/// Returns the acquisition error, naming the stage that failed.
pub async fn execute(globals: &GlobalArgs, args: &DownloadArgs) -> Result<()> {
    let provisioner = Provisioner::from_settings(&globals.settings()?)?;
    let executable = provisioner.acquire(&args.version, args.platform).await?;
    println!("{}", executable.display());
    Ok(())
}
