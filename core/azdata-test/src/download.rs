//! Artifact download and extraction.
//!
//! The update server does not serve archives itself. A download URL answers
//! with a `302` whose `Location` points at the real archive, and the suffix
//! of that location decides how the archive is extracted.
//!
//! ## Pipeline
//!
//! 1. GET `<server>/<version>/<platform>/stable` (or `latest/<platform>/insider`)
//!    without following redirects
//! 2. Stream the redirected archive to `<cache>/ads-<version>.<ext>.part`,
//!    then rename it into place
//! 3. Extract into `<cache>/ads-<version>`
//! 4. Remove the archive
//!
//! There are no retries. A failed extraction removes the half-written entry
//! so the next attempt starts clean.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::archive::{self, ArchiveFormat};
use crate::cache::CacheStore;
use crate::errors::{ProvisionError, Result};
use crate::net::HttpClient;
use crate::platform::Platform;
use crate::resolver::ResolvedVersion;

/// Downloads a build and extracts it into the cache.
pub trait ArtifactFetcher {
    /// Populates the cache entry for `version`. Only called on a cache miss
    /// or after a stale entry has been removed.
    fn fetch_and_extract(
        &self,
        version: &ResolvedVersion,
        platform: Platform,
        cache: &CacheStore,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`ArtifactFetcher`] backed by the update server.
#[derive(Debug, Clone)]
pub struct RemoteArtifacts {
    client: HttpClient,
    server: String,
}

impl RemoteArtifacts {
    #[must_use]
    pub fn new(client: HttpClient, server: impl Into<String>) -> Self {
        Self {
            client,
            server: server.into(),
        }
    }

    /// Returns the redirecting download URL for `version` on `platform`.
    #[must_use]
    pub fn download_url(&self, version: &ResolvedVersion, platform: Platform) -> String {
        match version {
            ResolvedVersion::Rolling => format!("{}/latest/{platform}/insider", self.server),
            ResolvedVersion::Release(v) => format!("{}/{v}/{platform}/stable", self.server),
        }
    }

    /// Follows the download endpoint's redirect by hand and returns the archive URL.
    async fn archive_location(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .no_follow()
            .get(url)
            .send()
            .await
            .map_err(|e| ProvisionError::network(url, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::FOUND {
            return Err(ProvisionError::redirect(url, status.as_u16()));
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| ProvisionError::redirect(url, status.as_u16()))
    }

    /// Streams `url` into `dest` via a `.part` sibling.
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let partial = partial_path(dest);
        match self.stream_to(url, &partial).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, dest).await.map_err(|e| {
                    ProvisionError::io(
                        format!(
                            "Failed to rename {} to {}",
                            partial.display(),
                            dest.display()
                        ),
                        e,
                    )
                })?;
                tracing::debug!(path = %dest.display(), bytes, "Download complete");
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .follow()
            .get(url)
            .send()
            .await
            .map_err(|e| ProvisionError::network(url, e))?;

        if !response.status().is_success() {
            return Err(ProvisionError::protocol(
                url,
                format!("HTTP status {}", response.status()),
            ));
        }

        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            ProvisionError::io(format!("Failed to create file: {}", dest.display()), e)
        })?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let start_time = Instant::now();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProvisionError::network(url, e))?;
            file.write_all(&chunk).await.map_err(|e| {
                ProvisionError::io(format!("Failed to write to {}", dest.display()), e)
            })?;
            downloaded += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ProvisionError::io(format!("Failed to flush {}", dest.display()), e))?;

        tracing::debug!(
            elapsed_ms = start_time.elapsed().as_millis(),
            bytes = downloaded,
            "Archive streamed"
        );
        Ok(downloaded)
    }
}

impl ArtifactFetcher for RemoteArtifacts {
    async fn fetch_and_extract(
        &self,
        version: &ResolvedVersion,
        platform: Platform,
        cache: &CacheStore,
    ) -> Result<()> {
        cache.ensure_root().await?;

        let url = self.download_url(version, platform);
        tracing::info!(%version, %url, "Downloading Azure Data Studio");

        let archive_url = self.archive_location(&url).await?;
        let format = ArchiveFormat::from_url(&archive_url);
        let archive_path = cache.archive_path(version, format);
        tracing::debug!(%archive_url, path = %archive_path.display(), "Resolved archive location");

        self.download(&archive_url, &archive_path).await?;
        install_archive(&archive_path, &cache.entry_dir(version), format).await?;

        tracing::info!(
            %version,
            path = %cache.entry_dir(version).display(),
            "Downloaded Azure Data Studio"
        );
        Ok(())
    }
}

/// Extracts a downloaded archive into `entry_dir` and removes the archive.
///
/// On extraction failure both the archive and whatever was extracted are
/// removed before the error is returned. Once extraction succeeds the entry
/// is complete; a leftover archive is only logged.
///
/// # Errors
///
/// Returns the extraction error.
pub async fn install_archive(
    archive: &Path,
    entry_dir: &Path,
    format: ArchiveFormat,
) -> Result<()> {
    if let Err(e) = archive::extract(archive, entry_dir, format).await {
        if let Err(cleanup) = tokio::fs::remove_dir_all(entry_dir).await
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %entry_dir.display(),
                error = %cleanup,
                "Failed to remove partial extraction"
            );
        }
        let _ = tokio::fs::remove_file(archive).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::remove_file(archive).await {
        tracing::warn!(
            path = %archive.display(),
            error = %e,
            "Failed to remove downloaded archive"
        );
    }
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
