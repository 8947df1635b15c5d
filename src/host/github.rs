//! GitHub REST implementation of [`HostClient`].

use crate::domain::Tag;
use crate::error::{ReleaseError, Result};
use crate::host::{
    CommitComparison, DirEntry, EntryKind, GitCommit, HostClient, HostCommit, RepoRef, TreeEntry,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ShaWire {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TagWire {
    name: String,
    commit: ShaWire,
}

#[derive(Debug, Deserialize)]
struct CommitDetailWire {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CompareCommitWire {
    sha: String,
    commit: CommitDetailWire,
}

#[derive(Debug, Deserialize)]
struct CompareFileWire {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct CompareWire {
    commits: Vec<CompareCommitWire>,
    #[serde(default)]
    files: Vec<CompareFileWire>,
}

#[derive(Debug, Deserialize)]
struct PullHeadWire {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Deserialize)]
struct PullWire {
    head: PullHeadWire,
}

#[derive(Debug, Deserialize)]
struct RefWire {
    object: ShaWire,
}

#[derive(Debug, Deserialize)]
struct GitCommitWire {
    sha: String,
    tree: ShaWire,
    #[serde(default)]
    parents: Vec<ShaWire>,
}

#[derive(Debug, Serialize)]
struct BlobRequest<'a> {
    content: &'a str,
    encoding: &'a str,
}

#[derive(Debug, Serialize)]
struct TreeRequest<'a> {
    base_tree: &'a str,
    tree: &'a [TreeEntry],
}

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
}

#[derive(Debug, Serialize)]
struct UpdateRefRequest<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Debug, Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

/// Turn an octocrab error into a release error, keeping 404s distinguishable
fn classify(operation: &str, subject: &str, err: octocrab::Error) -> ReleaseError {
    match &err {
        octocrab::Error::GitHub { source, .. } if source.message.contains("Not Found") => {
            ReleaseError::not_found(subject.to_string())
        }
        _ => ReleaseError::host(operation, err.to_string()),
    }
}

/// [`HostClient`] backed by the GitHub REST API.
pub struct GitHubHost {
    client: Octocrab,
}

impl GitHubHost {
    /// Creates a client authenticated with a personal or workflow token.
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| ReleaseError::host("build client", e.to_string()))?;

        Ok(GitHubHost { client })
    }

    /// Creates a client for a GitHub Enterprise Server API root.
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_uri)
            .map_err(|e| ReleaseError::config(format!("Invalid API URL '{}': {}", base_uri, e)))?
            .build()
            .map_err(|e| ReleaseError::host("build client", e.to_string()))?;

        Ok(GitHubHost { client })
    }

    fn route(repo: &RepoRef, tail: &str) -> String {
        format!("/repos/{}/{}/{}", repo.owner, repo.repo, tail)
    }
}

#[async_trait]
impl HostClient for GitHubHost {
    async fn list_tags(&self, repo: &RepoRef) -> Result<Vec<Tag>> {
        let tags: Vec<TagWire> = self
            .client
            .get(Self::route(repo, "tags"), None::<&()>)
            .await
            .map_err(|e| classify("list tags", &repo.to_string(), e))?;

        Ok(tags
            .into_iter()
            .map(|tag| Tag::new(tag.name, tag.commit.sha))
            .collect())
    }

    async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<CommitComparison> {
        let range = format!("{}...{}", base, head);
        let compare: CompareWire = self
            .client
            .get(Self::route(repo, &format!("compare/{}", range)), None::<&()>)
            .await
            .map_err(|e| classify("compare commits", &range, e))?;

        debug!(
            range = %range,
            commits = compare.commits.len(),
            files = compare.files.len(),
            "Compared commits"
        );

        // The compare endpoint lists commits oldest first.
        let commits = compare
            .commits
            .into_iter()
            .rev()
            .map(|c| HostCommit {
                sha: c.sha,
                message: c.commit.message,
            })
            .collect();

        Ok(CommitComparison {
            commits,
            files: compare.files.into_iter().map(|f| f.filename).collect(),
        })
    }

    async fn pull_request_head_ref(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Option<String>> {
        let subject = format!("pull request #{}", number);
        let result: std::result::Result<PullWire, _> = self
            .client
            .get(Self::route(repo, &format!("pulls/{}", number)), None::<&()>)
            .await;

        match result {
            Ok(pull) => Ok(Some(pull.head.ref_name)),
            Err(e) => match classify("get pull request", &subject, e) {
                ReleaseError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn get_ref(&self, repo: &RepoRef, ref_name: &str) -> Result<String> {
        let reference: RefWire = self
            .client
            .get(Self::route(repo, &format!("git/ref/{}", ref_name)), None::<&()>)
            .await
            .map_err(|e| classify("get ref", ref_name, e))?;

        Ok(reference.object.sha)
    }

    async fn get_commit(&self, repo: &RepoRef, sha: &str) -> Result<GitCommit> {
        let commit: GitCommitWire = self
            .client
            .get(Self::route(repo, &format!("git/commits/{}", sha)), None::<&()>)
            .await
            .map_err(|e| classify("get commit", sha, e))?;

        Ok(GitCommit {
            sha: commit.sha,
            tree_sha: commit.tree.sha,
            parents: commit.parents.into_iter().map(|p| p.sha).collect(),
        })
    }

    async fn create_blob(&self, repo: &RepoRef, content: &str) -> Result<String> {
        let body = BlobRequest {
            content,
            encoding: "utf-8",
        };
        let blob: ShaWire = self
            .client
            .post(Self::route(repo, "git/blobs"), Some(&body))
            .await
            .map_err(|e| classify("create blob", &repo.to_string(), e))?;

        Ok(blob.sha)
    }

    async fn create_tree(
        &self,
        repo: &RepoRef,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String> {
        let body = TreeRequest {
            base_tree,
            tree: entries,
        };
        let tree: ShaWire = self
            .client
            .post(Self::route(repo, "git/trees"), Some(&body))
            .await
            .map_err(|e| classify("create tree", base_tree, e))?;

        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String> {
        let body = CommitRequest {
            message,
            tree,
            parents,
        };
        let commit: ShaWire = self
            .client
            .post(Self::route(repo, "git/commits"), Some(&body))
            .await
            .map_err(|e| classify("create commit", tree, e))?;

        Ok(commit.sha)
    }

    async fn update_ref(&self, repo: &RepoRef, ref_name: &str, sha: &str) -> Result<()> {
        let body = UpdateRefRequest { sha, force: false };
        let _: RefWire = self
            .client
            .patch(Self::route(repo, &format!("git/refs/{}", ref_name)), Some(&body))
            .await
            .map_err(|e| classify("update ref", ref_name, e))?;

        Ok(())
    }

    async fn create_ref(&self, repo: &RepoRef, ref_name: &str, sha: &str) -> Result<()> {
        let body = CreateRefRequest { ref_name, sha };
        let _: RefWire = self
            .client
            .post(Self::route(repo, "git/refs"), Some(&body))
            .await
            .map_err(|e| classify("create ref", ref_name, e))?;

        Ok(())
    }

    async fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<DirEntry>> {
        let listing = self
            .client
            .repos(&repo.owner, &repo.repo)
            .get_content()
            .path(path)
            .r#ref(git_ref)
            .send()
            .await
            .map_err(|e| classify("get content", path, e))?;

        Ok(listing
            .items
            .into_iter()
            .map(|item| DirEntry {
                kind: EntryKind::from_type(&item.r#type),
                name: item.name,
                path: item.path,
            })
            .collect())
    }

    async fn get_file(&self, repo: &RepoRef, path: &str, git_ref: &str) -> Result<String> {
        let mut listing = self
            .client
            .repos(&repo.owner, &repo.repo)
            .get_content()
            .path(path)
            .r#ref(git_ref)
            .send()
            .await
            .map_err(|e| classify("get content", path, e))?;

        // A directory path yields several items; only a single file counts.
        if listing.items.len() != 1 || listing.items[0].r#type != "file" {
            return Err(ReleaseError::not_found(path.to_string()));
        }

        let item = listing.items.remove(0);
        item.decoded_content().ok_or_else(|| {
            ReleaseError::host("get content", format!("'{}' has no decodable content", path))
        })
    }
}
