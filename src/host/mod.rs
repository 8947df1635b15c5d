//! Hosting API abstraction layer
//!
//! This module provides a trait-based abstraction over the source-control
//! host, allowing the release pipeline to run against the real GitHub REST
//! API or against an in-memory host in tests.
//!
//! # Overview
//!
//! The primary abstraction is the [HostClient] trait, which defines the calls
//! release-train needs. The concrete implementations are:
//!
//! - [github::GitHubHost]: talks to the GitHub REST API through `octocrab`
//! - [mock::MockHost]: an in-memory object store for testing
//!
//! Every call takes the [RepoRef] it operates on; nothing about the target
//! repository is captured implicitly.

pub mod github;
pub mod mock;

pub use github::GitHubHost;
pub use mock::MockHost;

use crate::domain::Tag;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// File mode of a regular, non-executable file in a tree
pub const REGULAR_FILE_MODE: &str = "100644";

/// Owner and name of the repository being released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoRef {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A commit as reported by a compare
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommit {
    pub sha: String,
    pub message: String,
}

/// Commits and files between two points of history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitComparison {
    /// Newest first
    pub commits: Vec<HostCommit>,
    pub files: Vec<String>,
}

/// The parts of a commit object the publish step reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommit {
    pub sha: String,
    pub tree_sha: String,
    pub parents: Vec<String>,
}

/// One entry of a tree creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub sha: String,
}

impl TreeEntry {
    /// A regular file entry pointing at a blob
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        TreeEntry {
            path: path.into(),
            mode: REGULAR_FILE_MODE.to_string(),
            entry_type: "blob".to_string(),
            sha: sha.into(),
        }
    }
}

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    Other,
}

impl EntryKind {
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "dir" => EntryKind::Dir,
            "file" => EntryKind::File,
            _ => EntryKind::Other,
        }
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
}

/// Source-control host operations used by the release pipeline
///
/// All implementors must be `Send + Sync` so blob uploads can be driven
/// concurrently from one client.
///
/// Lookups of things that do not exist (a path, a ref) fail with
/// [crate::error::ReleaseError::NotFound]; every other failure is a
/// [crate::error::ReleaseError::Host].
#[async_trait]
pub trait HostClient: Send + Sync {
    /// List tags, most recent first
    async fn list_tags(&self, repo: &RepoRef) -> Result<Vec<Tag>>;

    /// Compare two commit-ishes; commits are returned newest first
    async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<CommitComparison>;

    /// Head branch of a pull request, `None` if there is no such pull request
    async fn pull_request_head_ref(&self, repo: &RepoRef, number: u64)
        -> Result<Option<String>>;

    /// Commit a ref points at. `ref_name` is relative to `refs/`, e.g. `heads/main`
    async fn get_ref(&self, repo: &RepoRef, ref_name: &str) -> Result<String>;

    async fn get_commit(&self, repo: &RepoRef, sha: &str) -> Result<GitCommit>;

    /// Store UTF-8 content, returning the blob id
    async fn create_blob(&self, repo: &RepoRef, content: &str) -> Result<String>;

    /// Create a tree from `entries` layered over `base_tree`
    async fn create_tree(
        &self,
        repo: &RepoRef,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String>;

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String>;

    /// Move an existing ref. Must be a fast-forward.
    async fn update_ref(&self, repo: &RepoRef, ref_name: &str, sha: &str) -> Result<()>;

    /// Create a new ref. `ref_name` is fully qualified, e.g. `refs/tags/v1.2.0`
    async fn create_ref(&self, repo: &RepoRef, ref_name: &str, sha: &str) -> Result<()>;

    /// Entries of a directory at `git_ref`
    async fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<DirEntry>>;

    /// Text content of a file at `git_ref`
    async fn get_file(&self, repo: &RepoRef, path: &str, git_ref: &str) -> Result<String>;
}
