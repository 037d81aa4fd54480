#![warn(clippy::pedantic)]

//! # Azure Data Studio test CLI (adst)
//!
//! The `adst` command downloads and caches Azure Data Studio builds and runs
//! extension test suites against them.
//!
//! ## Subcommands
//!
//! - `download` - Acquire a build and print its executable path
//! - `run` - Launch an extension test suite
//! - `versions` - List published stable versions
//! - `cli-path` - Print the command-line launcher for an executable
//! - `cache list` / `cache clean` - Inspect or empty the cache
//! - `runner-options` - Print mocha options derived from the environment
//!
//! ## Examples
//!
//! Download the latest stable build:
//! ```bash
//! adst download
//! ```
//!
//! Run a test suite against Insiders:
//! ```bash
//! adst run --version insiders ./my-extension ./my-extension/out/test
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use azdata_test::ProvisionError;
use clap::{Parser, Subcommand};
use commands::{cache, cli_path, download, run, runner_options, versions};
use tracing_subscriber::EnvFilter;

/// Azure Data Studio test CLI.
#[derive(Parser)]
#[command(
    name = "adst",
    author,
    version,
    about = "Download, cache and launch Azure Data Studio for extension tests",
    after_help = "\
ENVIRONMENT VARIABLES:
    ADS_TEST_UPDATE_SERVER  Update server URL (default: https://azuredatastudio-update.azurewebsites.net)
    ADS_TEST_DIR            Cache directory (default: ./.ads-test)
    ADS_TEST_TIMEOUT_SECS   Longest wait for response data in seconds (default: 300)
    HTTPS_PROXY, HTTP_PROXY Proxy for update server requests
    RUST_LOG                Log filter, overrides -v"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Cache directory, overriding ADS_TEST_DIR.
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Update server URL, overriding ADS_TEST_UPDATE_SERVER.
    #[arg(long, global = true, value_name = "URL")]
    pub update_server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the adst CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Download a build if needed and print its executable path.
    ///
    /// Cached releases are reused without contacting the update server.
    /// A cached Insiders build is replaced when a newer one is published.
    Download(download::DownloadArgs),

    /// Run an extension test suite.
    ///
    /// Launches Azure Data Studio as an Extension Development Host. The exit
    /// code of the test run becomes the exit code of adst.
    Run(run::RunArgs),

    /// List published stable versions, newest first.
    Versions(versions::VersionsArgs),

    /// Print the command-line launcher that ships with an executable.
    CliPath(cli_path::CliPathArgs),

    /// Inspect or empty the build cache.
    Cache(cache::CacheArgs),

    /// Print default mocha options for a test suite as JSON.
    RunnerOptions(runner_options::RunnerOptionsArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Handles an error and returns the appropriate exit code.
///
/// A failed test run exits with the suite's own exit code; its output has
/// already been printed.
fn handle_error(e: &anyhow::Error) -> i32 {
    if let Some(ProvisionError::ProcessExitCode { code }) = e.downcast_ref::<ProvisionError>() {
        return *code;
    }
    eprintln!("Error: {e:?}");
    1
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("azdata_test=info,adst=info"),
        1 => EnvFilter::new("azdata_test=debug,adst=debug"),
        _ => EnvFilter::new("azdata_test=trace,adst=trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let globals = commands::GlobalArgs {
        cache_dir: cli.cache_dir,
        update_server: cli.update_server,
    };

    match cli.command {
        Commands::Download(args) => download::execute(&globals, &args).await,
        Commands::Run(args) => run::execute(&globals, &args).await,
        Commands::Versions(args) => versions::execute(&globals, &args).await,
        Commands::CliPath(args) => cli_path::execute(&args),
        Commands::Cache(args) => cache::execute(&globals, &args).await,
        Commands::RunnerOptions(args) => runner_options::execute(&args),
    }
}
