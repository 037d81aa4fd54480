//! HTTP clients shared by the release index and the artifact fetcher.
//!
//! Clients are built once from [`Settings`] so that proxy selection happens
//! a single time per provisioner.

use crate::config::Settings;
use crate::errors::{ProvisionError, Result};

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("azdata-test/", env!("CARGO_PKG_VERSION"));

/// Pair of reqwest clients configured from [`Settings`].
///
/// `follow` follows redirects and is used for JSON metadata and archive
/// bodies. `no_follow` surfaces redirects to the caller, which the download
/// endpoint relies on.
#[derive(Debug, Clone)]
pub struct HttpClient {
    follow: reqwest::Client,
    no_follow: reqwest::Client,
}

impl HttpClient {
    /// Builds both clients from settings.
    ///
    /// # Errors
    ///
    /// Returns a network error if a proxy URL is malformed, or a protocol
    /// error if the TLS backend cannot be initialised.
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            follow: build_client(settings, reqwest::redirect::Policy::default())?,
            no_follow: build_client(settings, reqwest::redirect::Policy::none())?,
        })
    }

    /// Client that follows redirects.
    #[must_use]
    pub fn follow(&self) -> &reqwest::Client {
        &self.follow
    }

    /// Client that returns redirects as responses.
    #[must_use]
    pub fn no_follow(&self) -> &reqwest::Client {
        &self.no_follow
    }

    /// GETs `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Network`] on transport failure and
    /// [`ProvisionError::Protocol`] on a non-success status.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET");
        let response = self
            .follow
            .get(url)
            .send()
            .await
            .map_err(|e| ProvisionError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::protocol(url, format!("HTTP status {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ProvisionError::network(url, e))
    }
}

/// Builds one client. Only connecting and each individual read are bounded,
/// so a slow archive download runs as long as data keeps arriving.
fn build_client(
    settings: &Settings,
    redirects: reqwest::redirect::Policy,
) -> Result<reqwest::Client> {
    let proxy = &settings.proxy;
    let mut builder = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .read_timeout(settings.read_timeout)
        .user_agent(USER_AGENT)
        .redirect(redirects);

    if proxy.is_empty() {
        builder = builder.no_proxy();
    }
    if let Some(url) = proxy.for_http() {
        let http = reqwest::Proxy::http(url).map_err(|e| ProvisionError::network(url, e))?;
        builder = builder.proxy(http);
    }
    if let Some(url) = proxy.for_https() {
        let https = reqwest::Proxy::https(url).map_err(|e| ProvisionError::network(url, e))?;
        builder = builder.proxy(https);
    }

    builder.build().map_err(|e| {
        ProvisionError::protocol("<client>", format!("failed to create HTTP client: {e}"))
    })
}
