//! Publishes many generated files as one commit.
//!
//! The host needs each object to exist before anything refers to it, so
//! publishing is a chain of stages, each consuming the previous result:
//!
//! ```text
//! read head -> create blobs -> create tree -> create commit -> move ref
//! ```
//!
//! Nothing before the last stage is visible on the branch. A failure in any
//! earlier stage leaves unreferenced objects behind and the branch untouched.

use crate::error::Result;
use crate::host::{HostClient, RepoRef, TreeEntry};
use futures::future::try_join_all;
use tracing::{debug, info};

/// A generated file to place in the release commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub path: String,
    pub content: String,
}

impl FileUpload {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        FileUpload {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Branch head read before building on top of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentCommit {
    pub commit_sha: String,
    pub tree_sha: String,
}

/// Result of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new commit was created and the branch moved to it
    Committed { commit_sha: String, tree_sha: String },
    /// The uploaded files matched the branch already; nothing was committed
    Unchanged { commit_sha: String },
}

impl PublishOutcome {
    /// Commit the branch points at after the publish
    pub fn commit_sha(&self) -> &str {
        match self {
            PublishOutcome::Committed { commit_sha, .. } => commit_sha,
            PublishOutcome::Unchanged { commit_sha } => commit_sha,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, PublishOutcome::Committed { .. })
    }
}

/// `"<prefix> (<version>)"`
pub fn release_commit_message(prefix: &str, version: &str) -> String {
    format!("{} ({})", prefix, version)
}

/// Builds blobs, a tree and a commit, then moves a branch to it
pub struct AtomicCommitBuilder<'a, H: HostClient + ?Sized> {
    host: &'a H,
    repo: &'a RepoRef,
    message_prefix: String,
}

impl<'a, H: HostClient + ?Sized> AtomicCommitBuilder<'a, H> {
    pub fn new(host: &'a H, repo: &'a RepoRef, message_prefix: impl Into<String>) -> Self {
        AtomicCommitBuilder {
            host,
            repo,
            message_prefix: message_prefix.into(),
        }
    }

    /// Publish `files` on `branch` as one commit labelled with `version`.
    ///
    /// When the resulting tree equals the branch's current tree the commit
    /// and ref update are skipped, so re-running a release against unchanged
    /// content does not stack empty commits.
    pub async fn publish(
        &self,
        files: &[FileUpload],
        branch: &str,
        version: &str,
    ) -> Result<PublishOutcome> {
        let current = self.read_head(branch).await?;

        if files.is_empty() {
            debug!(branch = %branch, "No files to publish");
            return Ok(PublishOutcome::Unchanged {
                commit_sha: current.commit_sha,
            });
        }

        let entries = self.create_blobs(files).await?;
        let tree_sha = self.create_tree(&current.tree_sha, &entries).await?;

        if tree_sha == current.tree_sha {
            info!(branch = %branch, commit = %current.commit_sha, "Release content already on branch");
            return Ok(PublishOutcome::Unchanged {
                commit_sha: current.commit_sha,
            });
        }

        let message = release_commit_message(&self.message_prefix, version);
        let commit_sha = self
            .create_commit(&message, &tree_sha, &current.commit_sha)
            .await?;
        self.move_ref(branch, &commit_sha).await?;

        info!(
            branch = %branch,
            commit = %commit_sha,
            files = files.len(),
            "Published release commit"
        );

        Ok(PublishOutcome::Committed {
            commit_sha,
            tree_sha,
        })
    }

    /// Stage 1: the branch head and its tree
    pub async fn read_head(&self, branch: &str) -> Result<CurrentCommit> {
        let commit_sha = self
            .host
            .get_ref(self.repo, &format!("heads/{}", branch))
            .await?;
        let commit = self.host.get_commit(self.repo, &commit_sha).await?;

        debug!(branch = %branch, commit = %commit_sha, tree = %commit.tree_sha, "Read branch head");

        Ok(CurrentCommit {
            commit_sha,
            tree_sha: commit.tree_sha,
        })
    }

    /// Stage 2: one blob per file, uploaded concurrently.
    ///
    /// Results come back in input order, so entry `i` always carries the
    /// blob of `files[i]` whatever order the uploads finish in.
    pub async fn create_blobs(&self, files: &[FileUpload]) -> Result<Vec<TreeEntry>> {
        let uploads = files
            .iter()
            .map(|file| self.host.create_blob(self.repo, &file.content));
        let blob_shas = try_join_all(uploads).await?;

        Ok(files
            .iter()
            .zip(blob_shas)
            .map(|(file, sha)| TreeEntry::blob(file.path.as_str(), sha))
            .collect())
    }

    /// Stage 3: a tree layering `entries` over the current tree
    pub async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String> {
        self.host.create_tree(self.repo, base_tree, entries).await
    }

    /// Stage 4: a commit whose only parent is the head read in stage 1
    pub async fn create_commit(&self, message: &str, tree: &str, parent: &str) -> Result<String> {
        self.host
            .create_commit(self.repo, message, tree, &[parent.to_string()])
            .await
    }

    /// Stage 5: move the branch. Rejected by the host if the branch moved since stage 1.
    pub async fn move_ref(&self, branch: &str, commit_sha: &str) -> Result<()> {
        self.host
            .update_ref(self.repo, &format!("heads/{}", branch), commit_sha)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;

    fn repo() -> RepoRef {
        RepoRef::new("acme", "shop")
    }

    fn seeded() -> (MockHost, String) {
        let mut host = MockHost::new();
        let head = host.commit_files(
            "main",
            "init",
            &[("README.md", "shop"), ("package.json", "{\"version\":\"1.0.0\"}")],
        )
        .unwrap();
        (host, head)
    }

    #[test]
    fn test_release_commit_message() {
        assert_eq!(
            release_commit_message("Auto generated - New Release", "v1.2.0"),
            "Auto generated - New Release (v1.2.0)"
        );
    }

    #[tokio::test]
    async fn test_publish_creates_single_commit() {
        let (host, head) = seeded();
        let repo = repo();
        let builder = AtomicCommitBuilder::new(&host, &repo, "Auto generated - New Release");

        let files = vec![
            FileUpload::new("CHANGELOG.md", "# Changelog\n"),
            FileUpload::new("package.json", "{\"version\":\"1.1.0\"}"),
            FileUpload::new("service/api/package.json", "{\"version\":\"1.1.0\"}"),
        ];
        let outcome = builder.publish(&files, "main", "v1.1.0").await.unwrap();

        assert!(outcome.is_committed());
        let new_head = outcome.commit_sha().to_string();
        assert_eq!(host.branch_head("main"), Some(new_head.clone()));
        assert_eq!(host.commit_parents(&new_head), Some(vec![head]));
        assert_eq!(
            host.commit_message(&new_head).as_deref(),
            Some("Auto generated - New Release (v1.1.0)")
        );
        assert_eq!(host.call_count("create_blob"), 3);
        assert_eq!(host.call_count("create_commit"), 1);

        // Untouched paths are inherited from the base tree
        assert_eq!(host.file_at("main", "README.md").as_deref(), Some("shop"));
        assert_eq!(
            host.file_at("main", "service/api/package.json").as_deref(),
            Some("{\"version\":\"1.1.0\"}")
        );
    }

    #[tokio::test]
    async fn test_blobs_zip_to_paths_by_index() {
        let (host, _) = seeded();
        let repo = repo();
        let builder = AtomicCommitBuilder::new(&host, &repo, "release");

        let files = vec![
            FileUpload::new("a.txt", "alpha"),
            FileUpload::new("b.txt", "beta"),
            FileUpload::new("c.txt", "gamma"),
        ];
        let outcome = builder.publish(&files, "main", "v1").await.unwrap();
        let entries = host.commit_tree_entries(outcome.commit_sha()).unwrap();

        for file in &files {
            let expected = git2::Oid::hash_object(git2::ObjectType::Blob, file.content.as_bytes())
                .unwrap()
                .to_string();
            assert_eq!(entries.get(&file.path), Some(&expected), "{}", file.path);
        }
    }

    #[tokio::test]
    async fn test_stage_order() {
        let (host, _) = seeded();
        let repo = repo();
        let builder = AtomicCommitBuilder::new(&host, &repo, "release");

        builder
            .publish(&[FileUpload::new("a.txt", "1")], "main", "v1")
            .await
            .unwrap();

        assert_eq!(
            host.calls(),
            vec!["get_ref", "get_commit", "create_blob", "create_tree", "create_commit", "update_ref"]
        );
    }

    #[tokio::test]
    async fn test_failure_before_ref_move_leaves_branch() {
        let (mut host, head) = seeded();
        host.fail_on("create_commit");
        let repo = repo();
        let builder = AtomicCommitBuilder::new(&host, &repo, "release");

        let result = builder
            .publish(&[FileUpload::new("CHANGELOG.md", "x")], "main", "v1")
            .await;

        assert!(result.is_err());
        assert_eq!(host.branch_head("main"), Some(head));
        assert_eq!(host.call_count("update_ref"), 0);
    }

    #[tokio::test]
    async fn test_blob_failure_aborts_before_tree() {
        let (mut host, head) = seeded();
        host.fail_on("create_blob");
        let repo = repo();
        let builder = AtomicCommitBuilder::new(&host, &repo, "release");

        let files = vec![FileUpload::new("a", "1"), FileUpload::new("b", "2")];
        assert!(builder.publish(&files, "main", "v1").await.is_err());
        assert_eq!(host.call_count("create_tree"), 0);
        assert_eq!(host.branch_head("main"), Some(head));
    }

    #[tokio::test]
    async fn test_unchanged_content_is_not_committed() {
        let (host, head) = seeded();
        let repo = repo();
        let builder = AtomicCommitBuilder::new(&host, &repo, "release");
        let before = host.commit_count();

        let outcome = builder
            .publish(&[FileUpload::new("README.md", "shop")], "main", "v1")
            .await
            .unwrap();

        assert_eq!(outcome, PublishOutcome::Unchanged { commit_sha: head.clone() });
        assert_eq!(host.commit_count(), before);
        assert_eq!(host.branch_head("main"), Some(head));
    }

    #[tokio::test]
    async fn test_concurrent_branch_move_is_rejected() {
        let (mut host, _) = seeded();
        let repo = repo();

        let (current, tree) = {
            let builder = AtomicCommitBuilder::new(&host, &repo, "release");
            let current = builder.read_head("main").await.unwrap();
            let entries = builder
                .create_blobs(&[FileUpload::new("CHANGELOG.md", "x")])
                .await
                .unwrap();
            let tree = builder.create_tree(&current.tree_sha, &entries).await.unwrap();
            (current, tree)
        };

        // Another writer lands on the branch in between
        let theirs = host.commit_files("main", "fix: hot", &[("src/a.js", "a")]).unwrap();

        let builder = AtomicCommitBuilder::new(&host, &repo, "release");
        let ours = builder
            .create_commit("release (v1)", &tree, &current.commit_sha)
            .await
            .unwrap();
        let err = builder.move_ref("main", &ours).await.unwrap_err();

        assert!(err.to_string().contains("not a fast forward"));
        assert_eq!(host.branch_head("main"), Some(theirs));
    }
}
