//! On-disk cache of extracted builds.
//!
//! ## Directory Structure
//!
//! ```text
//! .ads-test/                  # Cache root (or ADS_TEST_DIR)
//!   ads-1.32.0/               # Extracted stable build, reused forever
//!   ads-1.31.1/
//!   ads-insiders/             # Extracted Insiders build, replaced when stale
//! ```
//!
//! Directory existence is the only record of what is cached. Archives are
//! downloaded next to the entries and removed once extracted.

use std::path::{Path, PathBuf};

use crate::archive::ArchiveFormat;
use crate::errors::{ProvisionError, Result};
use crate::layout;
use crate::platform::Platform;
use crate::resolver::ResolvedVersion;

/// Prefix of every cache entry directory.
pub const ENTRY_PREFIX: &str = "ads-";

/// Cache of extracted builds rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    #[must_use = "returns new cache store without side effects"]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory for `version`.
    #[must_use = "returns the path without side effects"]
    pub fn entry_dir(&self, version: &ResolvedVersion) -> PathBuf {
        self.root.join(format!("{ENTRY_PREFIX}{version}"))
    }

    /// Checks whether an entry exists for `version`.
    #[must_use = "returns cache status without side effects"]
    pub fn exists(&self, version: &ResolvedVersion) -> bool {
        self.entry_dir(version).is_dir()
    }

    /// Returns the launchable binary for `version` on `platform`.
    #[must_use = "returns the path without side effects"]
    pub fn executable_path(&self, version: &ResolvedVersion, platform: Platform) -> PathBuf {
        layout::executable_path(&self.entry_dir(version), platform, version.is_rolling())
    }

    /// Returns the download target for `version` in `format`.
    #[must_use = "returns the path without side effects"]
    pub fn archive_path(&self, version: &ResolvedVersion, format: ArchiveFormat) -> PathBuf {
        self.root
            .join(format!("{ENTRY_PREFIX}{version}{}", format.extension()))
    }

    /// Creates the cache root if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            ProvisionError::io(
                format!("Failed to create directory: {}", self.root.display()),
                e,
            )
        })
    }

    /// Deletes the entry for `version` completely.
    ///
    /// A missing entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Eviction`] if deletion fails or leaves the
    /// directory behind.
    pub async fn remove(&self, version: &ResolvedVersion) -> Result<()> {
        let dir = self.entry_dir(version);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ProvisionError::eviction(dir, e)),
        }

        if tokio::fs::try_exists(&dir).await.unwrap_or(true) {
            return Err(ProvisionError::eviction(
                &dir,
                std::io::Error::other("directory still present after removal"),
            ));
        }
        tracing::debug!(path = %dir.display(), "Removed cache entry");
        Ok(())
    }

    /// Lists cached entry versions, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache root exists but cannot be read.
    pub fn entries(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let read_dir = std::fs::read_dir(&self.root).map_err(|e| {
            ProvisionError::io(
                format!("Failed to read cache directory: {}", self.root.display()),
                e,
            )
        })?;

        let mut versions = Vec::new();
        for entry in read_dir {
            let entry =
                entry.map_err(|e| ProvisionError::io("Failed to read directory entry", e))?;
            let path = entry.path();
            if path.is_dir()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
                && let Some(version) = name.strip_prefix(ENTRY_PREFIX)
            {
                versions.push(version.to_string());
            }
        }

        versions.sort();
        Ok(versions)
    }

    /// Removes every cached entry.
    ///
    /// Returns the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns the first eviction failure.
    pub async fn clean(&self) -> Result<usize> {
        let versions = self.entries()?;
        for version in &versions {
            let resolved = if version == crate::resolver::INSIDERS {
                ResolvedVersion::Rolling
            } else {
                ResolvedVersion::Release(version.clone())
            };
            self.remove(&resolved).await?;
        }
        Ok(versions.len())
    }
}
