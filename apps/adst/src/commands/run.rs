//! Run command for the adst CLI.
//!
//! Launches Azure Data Studio as an Extension Development Host and waits for
//! the test suite to finish.
//!
//! ## Usage
//!
//! ```bash
//! adst run ./ext ./ext/out/test
//! adst run --version insiders --env ADS_TEST_GREP=@smoke ./ext ./ext/out/test
//! adst run ./ext ./ext/out/test -- ./workspace --disable-extensions
//! ```
//!
//! Arguments after `--` are passed to Azure Data Studio before the generated
//! extension arguments.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Result, bail};
use azdata_test::{Platform, Provisioner, TestOptions, VersionRequest, run_tests};
use clap::Args;

use super::GlobalArgs;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Extension root directory.
    pub extension_development_path: PathBuf,

    /// Test runner file or directory.
    pub extension_tests_path: PathBuf,

    /// Version to acquire: `stable`, `insiders`, or a release such as `1.32.0`.
    #[arg(long, default_value = "stable")]
    pub version: VersionRequest,

    /// Target platform. Defaults to the host.
    #[arg(long, short = 'p')]
    pub platform: Option<Platform>,

    /// Use this executable instead of acquiring one.
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Extra environment for the test process, as KEY=VALUE. Repeatable.
    #[arg(long = "env", short = 'e', value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Arguments passed to Azure Data Studio before the generated ones.
    #[arg(last = true)]
    pub launch_args: Vec<String>,
}

/// Executes the run command.
///
/// # Errors
///
/// Returns an error if an `--env` value is malformed, acquisition fails, the
/// process cannot start, or the suite exits non-zero.
pub async fn execute(globals: &GlobalArgs, args: &RunArgs) -> Result<()> {
    let extension_tests_env = parse_env(&args.env)?;
    let provisioner = Provisioner::from_settings(&globals.settings()?)?;

    let options = TestOptions {
        executable_path: args.executable.clone(),
        version: args.version.clone(),
        platform: args.platform,
        extension_development_path: args.extension_development_path.clone(),
        extension_tests_path: args.extension_tests_path.clone(),
        extension_tests_env,
        launch_args: args.launch_args.clone(),
    };

    run_tests(&provisioner, &options).await?;
    Ok(())
}

fn parse_env(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut env = HashMap::with_capacity(pairs.len());
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid --env value '{pair}': expected KEY=VALUE");
        };
        if key.is_empty() {
            bail!("Invalid --env value '{pair}': empty variable name");
        }
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}
