//! Release metadata from the Azure Data Studio update server.
//!
//! Two read-only endpoints are used:
//!
//! - `<server>/api/releases/stable`: JSON array of published stable
//!   versions, newest first
//! - `<server>/api/update/<platform>/insider/latest`: metadata for the
//!   newest Insiders build
//!
//! Nothing here is cached; every call is a network round trip.

use std::future::Future;

use crate::errors::{ProvisionError, Result};
use crate::net::HttpClient;
use crate::platform::Platform;
use crate::rolling::RollingMetadata;

/// Source of release metadata.
pub trait ReleaseIndex {
    /// Lists published stable versions in server order; index 0 is the latest.
    fn stable_versions(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Fetches the identity of the newest Insiders build for `platform`.
    fn rolling_metadata(
        &self,
        platform: Platform,
    ) -> impl Future<Output = Result<RollingMetadata>> + Send;
}

/// [`ReleaseIndex`] backed by the update server.
#[derive(Debug, Clone)]
pub struct RemoteIndex {
    client: HttpClient,
    server: String,
}

impl RemoteIndex {
    #[must_use]
    pub fn new(client: HttpClient, server: impl Into<String>) -> Self {
        Self {
            client,
            server: server.into(),
        }
    }

    /// URL of the stable release list.
    #[must_use]
    pub fn stable_releases_url(&self) -> String {
        format!("{}/api/releases/stable", self.server)
    }

    /// URL of the latest Insiders metadata for `platform`.
    #[must_use]
    pub fn rolling_metadata_url(&self, platform: Platform) -> String {
        format!("{}/api/update/{platform}/insider/latest", self.server)
    }
}

impl ReleaseIndex for RemoteIndex {
    async fn stable_versions(&self) -> Result<Vec<String>> {
        let url = self.stable_releases_url();
        let body = self.client.get_text(&url).await?;
        parse_version_list(&url, &body)
    }

    async fn rolling_metadata(&self, platform: Platform) -> Result<RollingMetadata> {
        let url = self.rolling_metadata_url(platform);
        let body = self.client.get_text(&url).await?;
        RollingMetadata::from_update_response(&url, &body)
    }
}

/// Parses the stable release list, keeping server order.
///
/// # Errors
///
/// Returns a protocol error if the body is not a JSON array of strings.
pub fn parse_version_list(url: &str, body: &str) -> Result<Vec<String>> {
    serde_json::from_str::<Vec<String>>(body).map_err(|e| {
        ProvisionError::protocol(url, format!("expected a JSON array of versions: {e}"))
    })
}
