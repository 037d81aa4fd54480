//! Versions command for the adst CLI.
//!
//! ## Usage
//!
//! ```bash
//! adst versions             # Stable releases, newest first
//! adst versions --json      # Same, as a JSON array
//! adst versions --insiders  # Latest Insiders commit for the platform
//! ```

use anyhow::Result;
use azdata_test::{Platform, Provisioner, ReleaseIndex};
use clap::Args;

use super::GlobalArgs;

/// Arguments for the versions command.
#[derive(Args)]
pub struct VersionsArgs {
    /// Output in JSON format.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Show the latest Insiders build instead of stable releases.
    #[arg(long)]
    pub insiders: bool,

    /// Platform for the Insiders lookup. Defaults to the host.
    #[arg(long, short = 'p')]
    pub platform: Option<Platform>,
}

/// Executes the versions command.
///
/// # Errors
///
/// Returns an error if the update server cannot be reached or answers with
/// an unexpected body.
pub async fn execute(globals: &GlobalArgs, args: &VersionsArgs) -> Result<()> {
    let provisioner = Provisioner::from_settings(&globals.settings()?)?;
    let index = provisioner.index();

    if args.insiders {
        let platform = args.platform.unwrap_or_else(Platform::host);
        let latest = index.rolling_metadata(platform).await?;
        let built_at = latest.built_at.map(|t| t.to_rfc3339());
        if args.json {
            let value = serde_json::json!({
                "platform": platform.as_str(),
                "commit": latest.identity_hash,
                "builtAt": built_at,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("Latest Insiders build for {platform}:");
            println!("  commit: {}", latest.identity_hash);
            if let Some(built_at) = built_at {
                println!("  built:  {built_at}");
            }
        }
        return Ok(());
    }

    let versions = index.stable_versions().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
    } else if versions.is_empty() {
        println!("No stable versions published.");
    } else {
        println!("Available stable versions:");
        println!();
        for (i, version) in versions.iter().enumerate() {
            if i == 0 {
                println!("  {version} (latest)");
            } else {
                println!("  {version}");
            }
        }
    }
    Ok(())
}
