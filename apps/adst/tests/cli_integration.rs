#![warn(clippy::pedantic)]

//! Integration tests for the adst CLI.
//!
//! These tests spawn the compiled binary and check stdout, stderr and exit
//! codes. None of them reach a real update server: commands that need the
//! network are pointed at a closed local port.
//!
//! ## Test Infrastructure
//!
//! - Uses `assert_cmd` for spawning and asserting on command execution
//! - Uses `assert_fs` for temporary cache directories
//! - Uses `predicates` for flexible output matching

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

/// Variables read by `runner-options`; cleared so the host environment cannot leak in.
const RUNNER_VARS: [&str; 6] = [
    "ADS_TEST_GREP",
    "ADS_TEST_INVERT_GREP",
    "RUN_UNSTABLE_TESTS",
    "ADS_TEST_TIMEOUT",
    "ADS_TEST_RETRIES",
    "BUILD_ARTIFACTSTAGINGDIRECTORY",
];

/// Unroutable update server for commands that must fail without network.
const CLOSED_SERVER: &str = "http://127.0.0.1:9";

fn adst() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adst"));
    cmd.env_remove("RUST_LOG");
    cmd
}

// -----------------------------------------------------------------------------
// Help
// -----------------------------------------------------------------------------

#[test]
fn help_lists_subcommands_and_environment() {
    adst()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("runner-options"))
        .stdout(predicate::str::contains("ADS_TEST_DIR"));
}

#[test]
fn missing_subcommand_is_usage_error() {
    adst().assert().failure().code(2);
}

#[test]
fn run_help_shows_paths() {
    adst()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EXTENSION_DEVELOPMENT_PATH"))
        .stdout(predicate::str::contains("--env"));
}

// -----------------------------------------------------------------------------
// cli-path
// -----------------------------------------------------------------------------

#[test]
fn cli_path_for_linux_insiders() {
    adst()
        .args([
            "cli-path",
            "--platform",
            "linux-x64",
            "/cache/ads-insiders/azuredatastudio-linux-x64/azuredatastudio-insiders",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "azuredatastudio-linux-x64/bin/azuredatastudio-insiders",
        ));
}

#[test]
fn cli_path_for_mac_bundle() {
    adst()
        .args([
            "cli-path",
            "--platform",
            "darwin",
            "/cache/ads-1.32.0/Azure Data Studio.app/Contents/MacOS/Electron",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Azure Data Studio.app/Contents/Resources/app/bin/code",
        ));
}

#[test]
fn unknown_platform_is_rejected() {
    adst()
        .args(["cli-path", "--platform", "solaris", "/tmp/exe"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("solaris"));
}

// -----------------------------------------------------------------------------
// cache
// -----------------------------------------------------------------------------

#[test]
fn cache_list_on_empty_directory() {
    let temp = assert_fs::TempDir::new().unwrap();

    adst()
        .arg("--cache-dir")
        .arg(temp.path())
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached builds"));
}

#[test]
fn cache_list_and_clean() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("ads-1.32.0/azuredatastudio-linux-x64/azuredatastudio")
        .write_str("bin")
        .unwrap();
    temp.child("ads-insiders").create_dir_all().unwrap();
    temp.child("unrelated").create_dir_all().unwrap();

    adst()
        .env("ADS_TEST_DIR", temp.path())
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.32.0"))
        .stdout(predicate::str::contains("insiders"))
        .stdout(predicate::str::contains("unrelated").not());

    adst()
        .env("ADS_TEST_DIR", temp.path())
        .args(["cache", "clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2"));

    temp.child("ads-1.32.0").assert(predicate::path::missing());
    temp.child("unrelated").assert(predicate::path::exists());
}

// -----------------------------------------------------------------------------
// runner-options
// -----------------------------------------------------------------------------

#[test]
fn runner_options_defaults_exclude_unstable() {
    let mut cmd = adst();
    for var in RUNNER_VARS {
        cmd.env_remove(var);
    }

    cmd.args(["runner-options", "Admin Tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""grep": "@UNSTABLE@""#))
        .stdout(predicate::str::contains(r#""invert": true"#))
        .stdout(predicate::str::contains(r#""timeout": 10000"#));
}

#[test]
fn runner_options_with_artifact_directory() {
    let mut cmd = adst();
    for var in RUNNER_VARS {
        cmd.env_remove(var);
    }

    cmd.env("BUILD_ARTIFACTSTAGINGDIRECTORY", "/artifacts")
        .env("ADS_TEST_RETRIES", "3")
        .args(["runner-options", "--platform", "linux-x64", "Admin Tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mocha-multi-reporters"))
        .stdout(predicate::str::contains(r#""retries": 3"#))
        .stdout(predicate::str::contains(
            "/artifacts/test-results/linux-admin-tool-results.xml",
        ));
}

// -----------------------------------------------------------------------------
// Network failures
// -----------------------------------------------------------------------------

#[test]
fn versions_reports_unreachable_server() {
    let temp = assert_fs::TempDir::new().unwrap();

    adst()
        .arg("--cache-dir")
        .arg(temp.path())
        .args(["--update-server", CLOSED_SERVER, "versions"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn download_failure_names_stage() {
    let temp = assert_fs::TempDir::new().unwrap();

    adst()
        .arg("--cache-dir")
        .arg(temp.path())
        .args(["--update-server", CLOSED_SERVER, "download", "--version", "1.32.0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("1.32.0"));

    temp.child("ads-1.32.0").assert(predicate::path::missing());
}

#[test]
fn download_of_cached_release_needs_no_network() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("ads-1.32.0").create_dir_all().unwrap();

    adst()
        .arg("--cache-dir")
        .arg(temp.path())
        .args([
            "--update-server",
            CLOSED_SERVER,
            "download",
            "--version",
            "1.32.0",
            "--platform",
            "linux-x64",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ads-1.32.0/azuredatastudio-linux-x64/azuredatastudio",
        ));
}
