//! Version resolution.
//!
//! Turns what the caller asked for into the concrete version that names a
//! cache entry and a download URL. The update server is consulted only when
//! the local cache cannot answer on its own.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::cache::CacheStore;
use crate::errors::{ProvisionError, Result};
use crate::index::ReleaseIndex;

/// Name of the Insiders channel on the update server and in cache paths.
pub const INSIDERS: &str = "insiders";

/// Alternative spelling accepted for the Insiders channel.
const ROLLING_ALIAS: &str = "rolling";

/// Keyword for the latest stable release.
const STABLE: &str = "stable";

/// A caller's version request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VersionRequest {
    /// Latest stable release.
    #[default]
    Stable,
    /// Latest Insiders build.
    Rolling,
    /// A specific release such as `1.32.0`.
    Explicit(String),
}

impl FromStr for VersionRequest {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            STABLE => Self::Stable,
            INSIDERS | ROLLING_ALIAS => Self::Rolling,
            other => Self::Explicit(other.to_string()),
        })
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.write_str(STABLE),
            Self::Rolling => f.write_str(INSIDERS),
            Self::Explicit(v) => f.write_str(v),
        }
    }
}

/// A concrete version naming one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedVersion {
    /// A numbered release; immutable once cached.
    Release(String),
    /// The Insiders channel; replaced when a newer build appears.
    Rolling,
}

impl ResolvedVersion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Release(v) => v,
            Self::Rolling => INSIDERS,
        }
    }

    #[must_use]
    pub fn is_rolling(&self) -> bool {
        matches!(self, Self::Rolling)
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves `request` to a concrete version.
///
/// - `Stable`: the first entry of the stable release list.
/// - `Rolling`: the Insiders sentinel, without any network call.
/// - `Explicit(v)`: returned as-is when already cached; otherwise it must
///   appear in the stable release list.
///
/// # Errors
///
/// - [`ProvisionError::NoStableVersion`] if the stable list is empty
/// - [`ProvisionError::InvalidVersion`] if an explicit version is unknown
/// - network and protocol errors from the index
pub async fn resolve<I: ReleaseIndex>(
    request: &VersionRequest,
    cache: &CacheStore,
    index: &I,
) -> Result<ResolvedVersion> {
    match request {
        VersionRequest::Stable => {
            tracing::debug!("Fetching latest stable version");
            latest_stable(index).await
        }
        VersionRequest::Rolling => Ok(ResolvedVersion::Rolling),
        VersionRequest::Explicit(v) if v == INSIDERS || v == ROLLING_ALIAS => {
            Ok(ResolvedVersion::Rolling)
        }
        VersionRequest::Explicit(v) => {
            let version = ResolvedVersion::Release(v.clone());
            if cache.exists(&version) {
                tracing::debug!(version = %v, "Version found in cache; skipping validation");
                return Ok(version);
            }
            let published = index.stable_versions().await?;
            if published.iter().any(|p| p == v) {
                Ok(version)
            } else {
                Err(ProvisionError::invalid_version(v.clone()))
            }
        }
    }
}

async fn latest_stable<I: ReleaseIndex>(index: &I) -> Result<ResolvedVersion> {
    index
        .stable_versions()
        .await?
        .into_iter()
        .next()
        .filter(|v| !v.trim().is_empty())
        .map(ResolvedVersion::Release)
        .ok_or(ProvisionError::NoStableVersion)
}
