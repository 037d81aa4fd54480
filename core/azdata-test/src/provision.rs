//! Acquisition of a runnable Azure Data Studio build.
//!
//! [`Provisioner::acquire`] is the single entry point. Per call it runs:
//!
//! ```text
//! resolve version -> check cache -+-> hit (fresh) ------------------> executable
//!                                 +-> hit (stale) -> evict -> fetch -> executable
//!                                 +-> miss -------------------> fetch -> executable
//! ```
//!
//! Numbered releases are immutable once cached, so any existing entry is a
//! fresh hit. The Insiders entry is fresh only if its commit matches the
//! latest build on the update server.

use std::path::PathBuf;

use crate::cache::CacheStore;
use crate::config::Settings;
use crate::download::{ArtifactFetcher, RemoteArtifacts};
use crate::errors::{ProvisionError, Result, Stage};
use crate::index::{ReleaseIndex, RemoteIndex};
use crate::net::HttpClient;
use crate::platform::Platform;
use crate::resolver::{self, ResolvedVersion, VersionRequest};
use crate::rolling;

/// Outcome of the cache check for a resolved version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheState {
    Fresh,
    Stale,
    Missing,
}

/// Downloads, caches and locates Azure Data Studio builds.
#[derive(Debug, Clone)]
pub struct Provisioner<I = RemoteIndex, F = RemoteArtifacts> {
    index: I,
    fetcher: F,
    cache: CacheStore,
    platform: Platform,
}

impl Provisioner {
    /// Creates a provisioner talking to the update server described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = HttpClient::new(settings)?;
        Ok(Self::new(
            RemoteIndex::new(client.clone(), settings.update_server.clone()),
            RemoteArtifacts::new(client, settings.update_server.clone()),
            CacheStore::new(settings.cache_root.clone()),
        ))
    }
}

impl<I: ReleaseIndex + Sync, F: ArtifactFetcher + Sync> Provisioner<I, F> {
    /// Creates a provisioner from explicit parts for the host platform.
    #[must_use]
    pub fn new(index: I, fetcher: F, cache: CacheStore) -> Self {
        Self {
            index,
            fetcher,
            cache,
            platform: Platform::host(),
        }
    }

    /// Overrides the default platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    #[must_use]
    pub fn index(&self) -> &I {
        &self.index
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolves `request` without touching the cache contents.
    ///
    /// # Errors
    ///
    /// See [`resolver::resolve`].
    pub async fn resolve(&self, request: &VersionRequest) -> Result<ResolvedVersion> {
        resolver::resolve(request, &self.cache, &self.index).await
    }

    /// Returns the executable for `request`, downloading only when needed.
    ///
    /// `platform` defaults to the provisioner's platform.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Acquisition`] naming the failed stage and
    /// wrapping the original error.
    pub async fn acquire(
        &self,
        request: &VersionRequest,
        platform: Option<Platform>,
    ) -> Result<PathBuf> {
        let platform = platform.unwrap_or(self.platform);

        let version = self
            .resolve(request)
            .await
            .map_err(|e| {
                ProvisionError::acquisition(Stage::ResolveVersion, request.to_string(), e)
            })?;
        tracing::info!(%version, %platform, "Resolved Azure Data Studio version");

        let wrap = |stage: Stage| {
            let version = version.to_string();
            move |e: ProvisionError| ProvisionError::acquisition(stage, version, e)
        };

        match self
            .check_cache(&version, platform)
            .await
            .map_err(wrap(Stage::CheckCache))?
        {
            CacheState::Fresh => {
                return Ok(self.cache.executable_path(&version, platform));
            }
            CacheState::Stale => {
                self.cache
                    .remove(&version)
                    .await
                    .map_err(wrap(Stage::Evict))?;
            }
            CacheState::Missing => {}
        }

        self.fetcher
            .fetch_and_extract(&version, platform, &self.cache)
            .await
            .map_err(wrap(Stage::Fetch))?;

        Ok(self.cache.executable_path(&version, platform))
    }

    async fn check_cache(
        &self,
        version: &ResolvedVersion,
        platform: Platform,
    ) -> Result<CacheState> {
        if !self.cache.exists(version) {
            return Ok(CacheState::Missing);
        }

        let entry_dir = self.cache.entry_dir(version);
        if !version.is_rolling() {
            tracing::info!(path = %entry_dir.display(), "Found cached build; skipping download");
            return Ok(CacheState::Fresh);
        }

        let remote = self.index.rolling_metadata(platform).await?;
        let local = match rolling::read_local_metadata(&entry_dir, platform).await {
            Ok(local) => local,
            Err(e) => {
                tracing::warn!(error = %e, "Cached Insiders build has no readable product.json");
                return Ok(CacheState::Stale);
            }
        };

        if rolling::is_stale(&local, &remote) {
            rolling::log_replacement(&entry_dir, &local, &remote);
            Ok(CacheState::Stale)
        } else {
            tracing::info!(
                path = %entry_dir.display(),
                commit = %local.identity_hash,
                "Cached Insiders build matches latest; skipping download"
            );
            Ok(CacheState::Fresh)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_settings_uses_cache_root() {
        let settings = Settings::with_cache_root("/tmp/ads-test-provision");
        let provisioner = Provisioner::from_settings(&settings).unwrap();
        assert_eq!(
            provisioner.cache().root(),
            std::path::Path::new("/tmp/ads-test-provision")
        );
        assert_eq!(provisioner.platform(), Platform::host());
    }

    #[test]
    fn with_platform_overrides_default() {
        let settings = Settings::with_cache_root("/tmp/ads-test-provision");
        let provisioner = Provisioner::from_settings(&settings)
            .unwrap()
            .with_platform(Platform::Darwin);
        assert_eq!(provisioner.platform(), Platform::Darwin);
    }
}
