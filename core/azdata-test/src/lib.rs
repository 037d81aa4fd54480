#![warn(clippy::pedantic)]
//! Test support for Azure Data Studio extensions.
//!
//! This crate downloads Azure Data Studio builds from the update server,
//! keeps them in a local cache and launches them as an Extension Development
//! Host against a test suite.
//!
//! ## Overview
//!
//! ```text
//! VersionRequest -> resolve -> cache check -> (evict) -> fetch + extract -> executable
//! ```
//!
//! Numbered releases are downloaded once and reused forever. The rolling
//! Insiders build lives in a single cache entry that is replaced whenever the
//! update server reports a newer commit.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use azdata_test::{Provisioner, Settings, TestOptions, VersionRequest, run_tests};
//!
//! async fn run() -> azdata_test::Result<i32> {
//!     let settings = Settings::from_env()?;
//!     let provisioner = Provisioner::from_settings(&settings)?;
//!
//!     let mut options = TestOptions::new("/path/to/extension", "/path/to/extension/out/test");
//!     options.version = VersionRequest::Rolling;
//!     run_tests(&provisioner, &options).await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`provision`]: the acquisition pipeline
//! - [`resolver`]: version requests and resolution
//! - [`index`] and [`download`]: update server access, behind traits
//! - [`cache`] and [`layout`]: on-disk entries and executable paths
//! - [`launch`]: running a test suite
//! - [`runner_options`]: default mocha options from the environment

pub mod archive;
pub mod cache;
pub mod config;
pub mod download;
pub mod errors;
pub mod index;
pub mod launch;
pub mod layout;
pub mod net;
pub mod platform;
pub mod provision;
pub mod resolver;
pub mod rolling;
pub mod runner_options;

#[cfg(test)]
mod test_support;

pub use archive::{ArchiveFormat, ExtractStatus};
pub use cache::CacheStore;
pub use config::{ProxyConfig, Settings};
pub use download::{ArtifactFetcher, RemoteArtifacts};
pub use errors::{ProvisionError, Result, Stage};
pub use index::{ReleaseIndex, RemoteIndex};
pub use launch::{TestOptions, run_tests};
pub use layout::cli_path;
pub use platform::Platform;
pub use provision::Provisioner;
pub use resolver::{ResolvedVersion, VersionRequest};
pub use rolling::RollingMetadata;
pub use runner_options::RunnerOptions;
