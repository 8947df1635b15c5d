//! Analysis of tags, commits and changed files for a release

pub mod area_classifier;
pub mod commit_classifier;
pub mod version_resolver;

pub use area_classifier::AreaClassifier;
pub use commit_classifier::CommitClassifier;
pub use version_resolver::{ResolvedVersion, VersionResolver};
