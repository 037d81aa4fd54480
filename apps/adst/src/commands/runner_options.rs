//! runner-options command for the adst CLI.
//!
//! Prints the mocha options a test runner should use, as derived from
//! `ADS_TEST_GREP`, `ADS_TEST_INVERT_GREP`, `RUN_UNSTABLE_TESTS`,
//! `ADS_TEST_TIMEOUT`, `ADS_TEST_RETRIES` and
//! `BUILD_ARTIFACTSTAGINGDIRECTORY`.

use anyhow::Result;
use azdata_test::{Platform, RunnerOptions};
use clap::Args;

/// Arguments for the runner-options command.
#[derive(Args)]
pub struct RunnerOptionsArgs {
    /// Test suite name, used in the junit report title and file name.
    pub suite: String,

    /// Platform named in the report. Defaults to the host.
    #[arg(long, short = 'p')]
    pub platform: Option<Platform>,
}

/// Executes the runner-options command.
///
/// # Errors
///
/// Returns an error if the options cannot be serialized.
pub fn execute(args: &RunnerOptionsArgs) -> Result<()> {
    let options = match args.platform {
        Some(platform) => {
            RunnerOptions::from_lookup(&args.suite, platform, |key| std::env::var(key).ok())
        }
        None => RunnerOptions::from_env(&args.suite),
    };
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}
