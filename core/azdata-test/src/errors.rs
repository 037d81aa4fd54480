//! Error types for Azure Data Studio provisioning.
//!
//! Every component fails fast and hands its error to the caller. Nothing in
//! this crate retries; a caller that wants a retry re-invokes
//! [`Provisioner::acquire`](crate::Provisioner::acquire).

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::archive::ExtractStatus;

/// Result alias used throughout the crate.
pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;

/// Pipeline stage an acquisition was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turning the version request into a concrete version.
    ResolveVersion,
    /// Inspecting the cache, including the rolling freshness check.
    CheckCache,
    /// Removing a stale rolling entry.
    Evict,
    /// Downloading and extracting the archive.
    Fetch,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveVersion => "resolve version",
            Self::CheckCache => "check cache",
            Self::Evict => "evict stale build",
            Self::Fetch => "download and extract",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consolidated error type for provisioning and launching.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Transport-level failure talking to the update server.
    #[error("network error reaching {url}")]
    Network {
        /// The URL being requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The update server answered with something we cannot interpret.
    #[error("unexpected response from {url}: {message}")]
    Protocol {
        /// The URL being requested.
        url: String,
        /// What was wrong with the response.
        message: String,
    },

    /// The download endpoint did not redirect to an archive.
    #[error("failed to get archive location from {url} (status {status})")]
    Redirect {
        /// The download endpoint.
        url: String,
        /// HTTP status returned instead of a usable 302.
        status: u16,
    },

    /// An explicit version that is neither cached nor a published release.
    #[error("invalid version {version}")]
    InvalidVersion {
        /// The requested version.
        version: String,
    },

    /// The stable release list was empty.
    #[error("failed to get latest Azure Data Studio version")]
    NoStableVersion,

    /// The native extraction tool failed.
    #[error("failed to extract archive at {}: {status}", archive.display())]
    Extraction {
        /// The archive being extracted.
        archive: PathBuf,
        /// How the extraction process ended.
        status: ExtractStatus,
    },

    /// A stale cache entry could not be removed.
    #[error("failed to remove outdated build at {}", path.display())]
    Eviction {
        /// The cache entry directory.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Error reading or writing files.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Umbrella error raised by the acquisition entry point.
    #[error("failed to {stage} for Azure Data Studio {version}")]
    Acquisition {
        /// The stage that failed.
        stage: Stage,
        /// The requested or resolved version.
        version: String,
        /// The original failure.
        #[source]
        source: Box<ProvisionError>,
    },

    /// The application process could not be started.
    #[error("failed to launch {}", executable.display())]
    Launch {
        /// The executable that was spawned.
        executable: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The application exited with a non-zero code.
    #[error("process exited with code {code}")]
    ProcessExitCode {
        /// The exit code.
        code: i32,
    },

    /// The application was terminated by a signal.
    #[error("process terminated by signal {signal}")]
    ProcessSignaled {
        /// The signal number.
        signal: i32,
    },
}

impl ProvisionError {
    #[must_use]
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    #[must_use]
    pub fn protocol(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            url: url.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn redirect(url: impl Into<String>, status: u16) -> Self {
        Self::Redirect {
            url: url.into(),
            status,
        }
    }

    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    #[must_use]
    pub fn extraction(archive: impl Into<PathBuf>, status: ExtractStatus) -> Self {
        Self::Extraction {
            archive: archive.into(),
            status,
        }
    }

    #[must_use]
    pub fn eviction(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Eviction {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    #[must_use]
    pub fn acquisition(stage: Stage, version: impl Into<String>, source: Self) -> Self {
        Self::Acquisition {
            stage,
            version: version.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn launch(executable: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Launch {
            executable: executable.into(),
            source,
        }
    }

    #[must_use]
    pub const fn process_exit_code(code: i32) -> Self {
        Self::ProcessExitCode { code }
    }

    /// Returns the originating error, looking through the acquisition umbrella.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Acquisition { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the failed stage if this is an acquisition error.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Acquisition { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_displays_version() {
        let err = ProvisionError::invalid_version("9.9.9");
        assert_eq!(err.to_string(), "invalid version 9.9.9");
    }

    #[test]
    fn redirect_displays_url_and_status() {
        let err = ProvisionError::redirect("https://example.com/1.0.0/linux-x64/stable", 200);
        assert_eq!(
            err.to_string(),
            "failed to get archive location from https://example.com/1.0.0/linux-x64/stable (status 200)"
        );
    }

    #[test]
    fn extraction_names_archive() {
        let status = ExtractStatus {
            exit_code: Some(2),
            signal: None,
        };
        let err = ProvisionError::extraction("/tmp/ads-1.0.0.tar.gz", status);
        let message = err.to_string();
        assert!(message.contains("/tmp/ads-1.0.0.tar.gz"));
        assert!(message.contains("exit code 2"));
    }

    #[test]
    fn acquisition_names_stage_and_keeps_cause() {
        let err = ProvisionError::acquisition(
            Stage::ResolveVersion,
            "9.9.9",
            ProvisionError::invalid_version("9.9.9"),
        );
        assert_eq!(
            err.to_string(),
            "failed to resolve version for Azure Data Studio 9.9.9"
        );
        assert_eq!(err.stage(), Some(Stage::ResolveVersion));
        assert!(matches!(
            err.root_cause(),
            ProvisionError::InvalidVersion { version } if version == "9.9.9"
        ));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("invalid version 9.9.9"));
    }

    #[test]
    fn root_cause_of_plain_error_is_itself() {
        let err = ProvisionError::NoStableVersion;
        assert!(matches!(err.root_cause(), ProvisionError::NoStableVersion));
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn process_exit_code_displays_code() {
        let err = ProvisionError::process_exit_code(42);
        assert_eq!(err.to_string(), "process exited with code 42");
    }
}
