//! Launching Azure Data Studio against an extension test suite.
//!
//! The application is started as an Extension Development Host:
//!
//! ```text
//! <executable> [launch args...] --no-sandbox \
//!     --extensionDevelopmentPath=<extension root> \
//!     --extensionTestsPath=<test runner>
//! ```
//!
//! Output is inherited from the calling process. The exit code decides
//! success; a signal is reported as its own error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::download::ArtifactFetcher;
use crate::errors::{ProvisionError, Result};
use crate::index::ReleaseIndex;
use crate::platform::Platform;
use crate::provision::Provisioner;
use crate::resolver::VersionRequest;

/// Options for one extension test run.
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    /// Executable to launch. When unset, `version` is acquired first.
    pub executable_path: Option<PathBuf>,
    /// Version to acquire when no executable is given.
    pub version: VersionRequest,
    /// Platform to acquire for; defaults to the provisioner's.
    pub platform: Option<Platform>,
    /// Extension root, passed as `--extensionDevelopmentPath`.
    pub extension_development_path: PathBuf,
    /// Test runner file or directory, passed as `--extensionTestsPath`.
    pub extension_tests_path: PathBuf,
    /// Extra environment for the launched process.
    pub extension_tests_env: HashMap<String, String>,
    /// Arguments placed before the generated ones, e.g. a workspace to open.
    pub launch_args: Vec<String>,
}

impl TestOptions {
    #[must_use]
    pub fn new(
        extension_development_path: impl Into<PathBuf>,
        extension_tests_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            extension_development_path: extension_development_path.into(),
            extension_tests_path: extension_tests_path.into(),
            ..Self::default()
        }
    }

    /// Full argument list passed to the executable.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = self.launch_args.clone();
        args.extend([
            "--no-sandbox".to_string(),
            format!(
                "--extensionDevelopmentPath={}",
                self.extension_development_path.display()
            ),
            format!(
                "--extensionTestsPath={}",
                self.extension_tests_path.display()
            ),
        ]);
        args
    }
}

/// Runs an extension test suite and returns the exit code on success.
///
/// # Errors
///
/// - acquisition errors when no executable was given
/// - [`ProvisionError::Launch`] if the process cannot be started
/// - [`ProvisionError::ProcessExitCode`] for a non-zero exit
/// - [`ProvisionError::ProcessSignaled`] if the process was killed
pub async fn run_tests<I, F>(provisioner: &Provisioner<I, F>, options: &TestOptions) -> Result<i32>
where
    I: ReleaseIndex + Sync,
    F: ArtifactFetcher + Sync,
{
    let executable = match &options.executable_path {
        Some(path) => path.clone(),
        None => provisioner.acquire(&options.version, options.platform).await?,
    };

    run_executable(&executable, &options.args(), &options.extension_tests_env).await
}

/// Spawns `executable` with `args` and an environment overlay, waiting for it to exit.
///
/// # Errors
///
/// See [`run_tests`].
pub async fn run_executable(
    executable: &Path,
    args: &[String],
    env: &HashMap<String, String>,
) -> Result<i32> {
    tracing::info!(executable = %executable.display(), ?args, "Launching Azure Data Studio");

    let status = Command::new(executable)
        .args(args)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| ProvisionError::launch(executable, e))?;

    match status.code() {
        Some(0) => {
            tracing::info!("Exit code: 0");
            Ok(0)
        }
        Some(code) => {
            tracing::warn!(code, "Extension tests failed");
            Err(ProvisionError::process_exit_code(code))
        }
        None => Err(ProvisionError::ProcessSignaled {
            signal: signal_of(status),
        }),
    }
}

#[cfg(unix)]
fn signal_of(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or_default()
}

#[cfg(not(unix))]
fn signal_of(_status: std::process::ExitStatus) -> i32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_args_come_before_generated_args() {
        let mut options = TestOptions::new("/ext", "/ext/out/test");
        options.launch_args = vec!["/workspace".to_string(), "--disable-extensions".to_string()];

        assert_eq!(
            options.args(),
            vec![
                "/workspace",
                "--disable-extensions",
                "--no-sandbox",
                "--extensionDevelopmentPath=/ext",
                "--extensionTestsPath=/ext/out/test",
            ]
        );
    }

    #[test]
    fn default_options_request_stable() {
        let options = TestOptions::new("/ext", "/tests");
        assert_eq!(options.version, VersionRequest::Stable);
        assert!(options.executable_path.is_none());
        assert!(options.platform.is_none());
    }

    #[tokio::test]
    async fn missing_executable_is_launch_error() {
        let err = run_executable(
            Path::new("/nonexistent/azuredatastudio"),
            &[],
            &HashMap::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProvisionError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_codes_are_reported() {
        let sh = Path::new("/bin/sh");
        let ok = run_executable(sh, &["-c".into(), "exit 0".into()], &HashMap::new()).await;
        assert_eq!(ok.unwrap(), 0);

        let err = run_executable(sh, &["-c".into(), "exit 3".into()], &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::ProcessExitCode { code: 3 }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn environment_overlay_reaches_process() {
        let env = HashMap::from([("ADS_TEST_MARKER".to_string(), "present".to_string())]);
        let result = run_executable(
            Path::new("/bin/sh"),
            &["-c".into(), "test \"$ADS_TEST_MARKER\" = present".into()],
            &env,
        )
        .await;
        assert_eq!(result.unwrap(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn signal_is_reported() {
        let err = run_executable(
            Path::new("/bin/sh"),
            &["-c".into(), "kill -9 $$".into()],
            &HashMap::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProvisionError::ProcessSignaled { signal: 9 }));
    }
}
