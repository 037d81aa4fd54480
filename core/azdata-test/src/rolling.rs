//! Freshness checks for the Insiders (rolling) channel.
//!
//! An Insiders build is identified by the commit hash embedded in its own
//! `product.json`. The update server reports the commit of the latest build
//! per platform. A cached build is reused when the two match.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ProvisionError, Result};
use crate::layout::product_descriptor_path;
use crate::platform::Platform;

/// Identity of one Insiders build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingMetadata {
    /// Commit hash the build was produced from.
    pub identity_hash: String,
    /// Build time, when known.
    pub built_at: Option<DateTime<Utc>>,
}

impl RollingMetadata {
    #[must_use]
    pub fn new(identity_hash: impl Into<String>, built_at: Option<DateTime<Utc>>) -> Self {
        Self {
            identity_hash: identity_hash.into(),
            built_at,
        }
    }

    /// Parses the update server's "latest Insiders" response.
    ///
    /// The commit is in `version`; `timestamp` holds epoch milliseconds as
    /// either a number or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the body is not a JSON object with a
    /// string `version`.
    pub fn from_update_response(url: &str, body: &str) -> Result<Self> {
        let response: UpdateResponse = serde_json::from_str(body)
            .map_err(|e| ProvisionError::protocol(url, format!("invalid update metadata: {e}")))?;

        let built_at = match response.timestamp {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .and_then(DateTime::<Utc>::from_timestamp_millis);

        Ok(Self::new(response.version, built_at))
    }

    fn describe(&self) -> String {
        match self.built_at {
            Some(at) => format!("{} | {}", self.identity_hash, at.to_rfc3339()),
            None => self.identity_hash.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    version: String,
    #[serde(default)]
    timestamp: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ProductDescriptor {
    commit: String,
    #[serde(default)]
    date: Option<String>,
}

/// Reads the identity of a cached Insiders build from its `product.json`.
///
/// # Errors
///
/// Returns an I/O error if the descriptor cannot be read, or a protocol
/// error if it lacks a `commit` field.
pub async fn read_local_metadata(entry_dir: &Path, platform: Platform) -> Result<RollingMetadata> {
    let path = product_descriptor_path(entry_dir, platform);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ProvisionError::io(format!("Failed to read {}", path.display()), e))?;

    let descriptor: ProductDescriptor = serde_json::from_str(&content).map_err(|e| {
        ProvisionError::protocol(path.display().to_string(), format!("invalid product.json: {e}"))
    })?;

    let built_at = descriptor
        .date
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc));

    Ok(RollingMetadata::new(descriptor.commit, built_at))
}

/// Returns `true` when the cached build differs from the latest one.
///
/// Only the identity hash is compared; timestamps are informational.
#[must_use]
pub fn is_stale(local: &RollingMetadata, remote: &RollingMetadata) -> bool {
    local.identity_hash != remote.identity_hash
}

/// Logs why a cached Insiders build is being replaced.
pub(crate) fn log_replacement(entry_dir: &Path, local: &RollingMetadata, remote: &RollingMetadata) {
    tracing::info!(
        path = %entry_dir.display(),
        old = %local.describe(),
        new = %remote.describe(),
        "Removing outdated Insiders build and re-downloading"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_hashes_are_fresh_regardless_of_time() {
        let local = RollingMetadata::new("abc", None);
        let built_at = DateTime::<Utc>::from_timestamp_millis(1_630_000_000_000);
        let remote = RollingMetadata::new("abc", built_at);
        assert!(!is_stale(&local, &remote));
    }

    #[test]
    fn different_hashes_are_stale() {
        let local = RollingMetadata::new("abc", None);
        let remote = RollingMetadata::new("def", None);
        assert!(is_stale(&local, &remote));
    }

    #[test]
    fn update_response_with_numeric_timestamp() {
        let body = r#"{"url":"https://x/y.zip","version":"c0ffee","timestamp":1630000000000}"#;
        let meta = RollingMetadata::from_update_response("u", body).unwrap();
        assert_eq!(meta.identity_hash, "c0ffee");
        assert_eq!(
            meta.built_at.map(|t| t.timestamp_millis()),
            Some(1_630_000_000_000)
        );
    }

    #[test]
    fn update_response_with_string_timestamp() {
        let body = r#"{"version":"c0ffee","timestamp":"1630000000000"}"#;
        let meta = RollingMetadata::from_update_response("u", body).unwrap();
        assert!(meta.built_at.is_some());
    }

    #[test]
    fn update_response_without_version_is_protocol_error() {
        let err = RollingMetadata::from_update_response("u", "[]").unwrap_err();
        assert!(matches!(err, ProvisionError::Protocol { .. }));
    }

    #[tokio::test]
    async fn reads_commit_and_date_from_product_json() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = product_descriptor_path(temp.path(), Platform::LinuxX64);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"nameShort":"Azure Data Studio - Insiders","commit":"abc123","date":"2021-08-26T17:35:12.000Z"}"#,
        )
        .unwrap();

        let meta = read_local_metadata(temp.path(), Platform::LinuxX64)
            .await
            .unwrap();
        assert_eq!(meta.identity_hash, "abc123");
        assert!(meta.built_at.is_some());
    }

    #[tokio::test]
    async fn missing_product_json_is_io_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = read_local_metadata(temp.path(), Platform::Darwin)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Io { .. }));
    }
}
