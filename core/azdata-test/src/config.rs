//! Provisioning settings.
//!
//! Settings are read once, usually from the environment, and handed to a
//! [`Provisioner`](crate::Provisioner). Nothing in the crate consults the
//! environment after that point.
//!
//! ## Environment Variables
//!
//! - `ADS_TEST_UPDATE_SERVER`: update server base URL
//!   (default: `https://azuredatastudio-update.azurewebsites.net`)
//! - `ADS_TEST_DIR`: cache root (default: `.ads-test` under the working directory)
//! - `ADS_TEST_TIMEOUT_SECS`: longest wait for the next chunk of a response, in
//!   seconds (default: 300). A download that keeps receiving data is never cut off.
//! - `HTTP_PROXY` / `http_proxy`: proxy for every request
//! - `HTTPS_PROXY` / `https_proxy`: proxy for https requests, overriding `HTTP_PROXY`

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{ProvisionError, Result};

/// Environment variable to override the update server URL.
pub const UPDATE_SERVER_ENV: &str = "ADS_TEST_UPDATE_SERVER";

/// Environment variable to override the cache root.
pub const CACHE_DIR_ENV: &str = "ADS_TEST_DIR";

/// Environment variable to override the read timeout.
pub const TIMEOUT_ENV: &str = "ADS_TEST_TIMEOUT_SECS";

/// Default update server.
pub const DEFAULT_UPDATE_SERVER: &str = "https://azuredatastudio-update.azurewebsites.net";

/// Cache directory name created under the working directory.
pub const DEFAULT_CACHE_DIR_NAME: &str = ".ads-test";

/// Default read timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default connect timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Proxy URLs applied to outgoing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy for plain http requests; also used for https when `https` is unset.
    pub http: Option<String>,
    /// Proxy for https requests.
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Reads proxy settings through `lookup`, upper-case names first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |upper: &str, lower: &str| {
            lookup(upper)
                .or_else(|| lookup(lower))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            http: read("HTTP_PROXY", "http_proxy"),
            https: read("HTTPS_PROXY", "https_proxy"),
        }
    }

    /// Proxy to use for https URLs.
    #[must_use]
    pub fn for_https(&self) -> Option<&str> {
        self.https.as_deref().or(self.http.as_deref())
    }

    /// Proxy to use for http URLs.
    #[must_use]
    pub fn for_http(&self) -> Option<&str> {
        self.http.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

/// Everything a [`Provisioner`](crate::Provisioner) needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Update server base URL, without a trailing slash.
    pub update_server: String,
    /// Directory holding cached builds.
    pub cache_root: PathBuf,
    /// Proxy configuration.
    pub proxy: ProxyConfig,
    /// Longest gap between reads on a response. There is no limit on the
    /// total duration of a request.
    pub read_timeout: Duration,
    /// Limit on establishing a connection.
    pub connect_timeout: Duration,
}

impl Settings {
    /// Creates settings with defaults and the given cache root.
    #[must_use = "returns new settings without side effects"]
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            update_server: DEFAULT_UPDATE_SERVER.to_string(),
            cache_root: cache_root.into(),
            proxy: ProxyConfig::default(),
            read_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `ADS_TEST_DIR` is unset and the working directory
    /// cannot be determined.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| ProvisionError::io("Failed to determine working directory", e))?;
        Ok(Self::from_lookup(&cwd, |key| std::env::var(key).ok()))
    }

    /// Reads settings through `lookup`, resolving the default cache root against `cwd`.
    ///
    /// Empty or whitespace-only values are treated as unset.
    pub fn from_lookup(cwd: &std::path::Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let cache_root = non_blank(CACHE_DIR_ENV)
            .map_or_else(|| cwd.join(DEFAULT_CACHE_DIR_NAME), |dir| cwd.join(dir));

        let mut settings = Self::with_cache_root(cache_root);
        if let Some(server) = non_blank(UPDATE_SERVER_ENV) {
            settings = settings.update_server(server);
        }
        if let Some(secs) = non_blank(TIMEOUT_ENV).and_then(|s| s.parse::<u64>().ok())
            && secs > 0
        {
            settings.read_timeout = Duration::from_secs(secs);
        }
        settings.proxy = ProxyConfig::from_lookup(&lookup);
        settings
    }

    /// Replaces the update server, dropping any trailing slash.
    #[must_use]
    pub fn update_server(mut self, server: impl AsRef<str>) -> Self {
        self.update_server = server.as_ref().trim().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the cache root.
    #[must_use]
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = root.into();
        self
    }

    /// Replaces the proxy configuration.
    #[must_use]
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }
}
