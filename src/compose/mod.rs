//! Turning a [`ReleaseDataset`] into file contents
//!
//! Composers are pluggable; the defaults here write a Markdown changelog and
//! bump JSON package manifests.

pub mod changelog;
pub mod manifest;

pub use changelog::MarkdownChangelog;
pub use manifest::{manifest_paths, JsonManifest};

use crate::domain::ReleaseDataset;
use crate::error::Result;

/// Produces the full changelog text for a release
pub trait ChangelogComposer: Send + Sync {
    /// `existing` is the current changelog, if the repository has one
    fn compose(&self, data: &ReleaseDataset, existing: Option<&str>) -> String;
}

/// Produces an updated package manifest
pub trait ManifestUpdater: Send + Sync {
    fn update(&self, path: &str, existing: &str, version: &str) -> Result<String>;
}
