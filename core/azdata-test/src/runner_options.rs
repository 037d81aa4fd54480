//! Default mocha options for an extension test suite, read from the environment.
//!
//! | Variable                         | Effect                                        |
//! |----------------------------------|-----------------------------------------------|
//! | `ADS_TEST_GREP`                  | test filter                                   |
//! | `ADS_TEST_INVERT_GREP`           | non-zero integer inverts the filter           |
//! | `RUN_UNSTABLE_TESTS`             | `true` runs tests tagged `@UNSTABLE@`         |
//! | `ADS_TEST_TIMEOUT`               | per-test timeout in milliseconds              |
//! | `ADS_TEST_RETRIES`               | retry count                                   |
//! | `BUILD_ARTIFACTSTAGINGDIRECTORY` | enables junit output under this directory     |

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::platform::Platform;

pub const GREP_ENV: &str = "ADS_TEST_GREP";
pub const INVERT_GREP_ENV: &str = "ADS_TEST_INVERT_GREP";
pub const RUN_UNSTABLE_ENV: &str = "RUN_UNSTABLE_TESTS";
pub const TEST_TIMEOUT_ENV: &str = "ADS_TEST_TIMEOUT";
pub const RETRIES_ENV: &str = "ADS_TEST_RETRIES";
pub const ARTIFACT_DIR_ENV: &str = "BUILD_ARTIFACTSTAGINGDIRECTORY";

/// Tag excluded from runs unless unstable tests are requested.
pub const UNSTABLE_TAG: &str = "@UNSTABLE@";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const MULTI_REPORTER: &str = "mocha-multi-reporters";
const ENABLED_REPORTERS: &str = "spec, mocha-junit-reporter";

/// Mocha options, serialized in mocha's camelCase shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerOptions {
    pub ui: String,
    pub use_colors: bool,
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_options: Option<ReporterOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterOptions {
    pub reporter_enabled: String,
    pub mocha_junit_reporter_reporter_options: JunitOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JunitOptions {
    pub testsuites_title: String,
    pub mocha_file: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            ui: "bdd".to_string(),
            use_colors: true,
            timeout: DEFAULT_TIMEOUT_MS,
            grep: None,
            invert: None,
            retries: None,
            reporter: None,
            reporter_options: None,
        }
    }
}

impl RunnerOptions {
    /// Builds options for `suite` from the process environment on the host platform.
    #[must_use]
    pub fn from_env(suite: &str) -> Self {
        Self::from_lookup(suite, Platform::host(), |key| std::env::var(key).ok())
    }

    /// Builds options for `suite` with variables read through `lookup`.
    #[must_use]
    pub fn from_lookup(
        suite: &str,
        platform: Platform,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut options = Self::default();

        if let Some(grep) = var(GREP_ENV) {
            options.grep = Some(grep);
            options.invert = Some(var(INVERT_GREP_ENV).and_then(parse_nonzero).is_some());
        } else if var(RUN_UNSTABLE_ENV).as_deref() != Some("true") {
            options.grep = Some(UNSTABLE_TAG.to_string());
            options.invert = Some(true);
        }

        if let Some(timeout) = var(TEST_TIMEOUT_ENV).and_then(|v| v.trim().parse::<u64>().ok())
            && timeout > 0
        {
            options.timeout = timeout;
        }
        if let Some(retries) = var(RETRIES_ENV).and_then(|v| v.trim().parse::<u32>().ok())
            && retries > 0
        {
            options.retries = Some(retries);
        }

        if let Some(dir) = var(ARTIFACT_DIR_ENV) {
            options.reporter = Some(MULTI_REPORTER.to_string());
            options.reporter_options = Some(ReporterOptions {
                reporter_enabled: ENABLED_REPORTERS.to_string(),
                mocha_junit_reporter_reporter_options: JunitOptions {
                    testsuites_title: format!("{suite} {}", platform.os_name()),
                    mocha_file: junit_file(Path::new(&dir), suite, platform),
                },
            });
        }

        tracing::debug!(?options, "Test options");
        options
    }
}

/// `Some` for a non-zero integer.
fn parse_nonzero(value: String) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n != 0)
}

/// `<dir>/test-results/<os>-<suite slug>-results.xml`
fn junit_file(dir: &Path, suite: &str, platform: Platform) -> PathBuf {
    let slug: String = suite
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect();
    dir.join("test-results")
        .join(format!("{}-{slug}-results.xml", platform.os_name()))
}
