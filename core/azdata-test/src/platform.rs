//! Platform detection for Azure Data Studio downloads.
//!
//! The update server publishes one artifact kind per operating system:
//!
//! - Windows `x86_64` user archive (`win32-x64-archive`)
//! - macOS universal (`darwin`)
//! - Linux `x86_64` (`linux-x64`)

use std::fmt;
use std::str::FromStr;

/// Artifact kind published by the update server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows `x86_64` zip archive
    WindowsX64Archive,
    /// macOS application bundle
    Darwin,
    /// Linux `x86_64` tarball
    LinuxX64,
}

impl Platform {
    /// All platforms the update server publishes.
    pub const ALL: [Self; 3] = [Self::WindowsX64Archive, Self::Darwin, Self::LinuxX64];

    /// Detects the platform of the running process.
    ///
    /// Anything that is neither Windows nor macOS is treated as Linux.
    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Self::WindowsX64Archive
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::LinuxX64
        }
    }

    /// Returns the identifier used in update server URLs.
    #[must_use = "returns the platform string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WindowsX64Archive => "win32-x64-archive",
            Self::Darwin => "darwin",
            Self::LinuxX64 => "linux-x64",
        }
    }

    /// Returns the short OS name (`win32`, `darwin`, `linux`).
    ///
    /// Used in test report titles and file names.
    #[must_use]
    pub fn os_name(self) -> &'static str {
        match self {
            Self::WindowsX64Archive => "win32",
            Self::Darwin => "darwin",
            Self::LinuxX64 => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unsupported platform '{s}'. Supported platforms are: win32-x64-archive, darwin, linux-x64"
                )
            })
    }
}
