//! Archive extraction through the platform's native tools.
//!
//! The update server picks the archive format per platform, so the format
//! is read from the resolved archive URL rather than from the request.
//!
//! - `.zip`: `unzip` on Unix, `Expand-Archive` through PowerShell on Windows
//! - `.tar.gz`: `tar -xzf`, after creating the destination (tar does not)

use std::fmt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::errors::{ProvisionError, Result};

/// Archive formats served by the update server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Zip archive (Windows and macOS)
    Zip,
    /// Gzip-compressed tarball (Linux)
    TarGz,
}

impl ArchiveFormat {
    /// Picks the format from the archive URL's suffix.
    ///
    /// Anything not ending in `.zip` is treated as a gzip tarball.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".zip") {
            Self::Zip
        } else {
            Self::TarGz
        }
    }

    /// File extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }
}

/// How an extraction process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractStatus {
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Terminating signal, if the process was killed (Unix only).
    pub signal: Option<i32>,
}

impl ExtractStatus {
    /// Success means exit code 0 and no signal.
    #[must_use]
    pub fn success(self) -> bool {
        self.exit_code == Some(0) && self.signal.is_none()
    }
}

impl From<ExitStatus> for ExtractStatus {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            exit_code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ExtractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.exit_code, self.signal) {
            (_, Some(signal)) => write!(f, "terminated by signal {signal}"),
            (Some(code), None) => write!(f, "exit code {code}"),
            (None, None) => f.write_str("failed to run"),
        }
    }
}

/// Extracts `archive` into `dest` using the native tool for `format`.
///
/// # Errors
///
/// Returns [`ProvisionError::Extraction`] naming the archive if the tool
/// cannot be started, exits non-zero, or is killed by a signal. Returns an
/// I/O error if the tarball destination cannot be created.
pub async fn extract(archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let mut command = match format {
        ArchiveFormat::Zip => unzip_command(archive, dest),
        ArchiveFormat::TarGz => {
            tokio::fs::create_dir_all(dest).await.map_err(|e| {
                ProvisionError::io(format!("Failed to create directory: {}", dest.display()), e)
            })?;
            tar_command(archive, dest)
        }
    };

    tracing::debug!(archive = %archive.display(), dest = %dest.display(), ?format, "Extracting");

    let output = command
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to start extraction tool");
            ProvisionError::extraction(archive, ExtractStatus::default())
        })?;

    let status = ExtractStatus::from(output.status);
    if !status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(%status, stderr = %stderr.trim(), "Extraction failed");
        return Err(ProvisionError::extraction(archive, status));
    }
    Ok(())
}

#[cfg(windows)]
fn unzip_command(archive: &Path, dest: &Path) -> Command {
    let mut command = Command::new("powershell.exe");
    command.args([
        "-NoProfile",
        "-ExecutionPolicy",
        "Bypass",
        "-NonInteractive",
        "-NoLogo",
        "-Command",
    ]);
    command.arg(format!(
        "Microsoft.PowerShell.Archive\\Expand-Archive -Path \"{}\" -DestinationPath \"{}\"",
        archive.display(),
        dest.display()
    ));
    command
}

#[cfg(not(windows))]
fn unzip_command(archive: &Path, dest: &Path) -> Command {
    let mut command = Command::new("unzip");
    command.arg("-q").arg(archive).arg("-d").arg(dest);
    command
}

fn tar_command(archive: &Path, dest: &Path) -> Command {
    let mut command = Command::new("tar");
    command.arg("-xzf").arg(archive).arg("-C").arg(dest);
    command
}
