use crate::error::Result;
use crate::host::{DirEntry, EntryKind, HostClient, RepoRef};
use tracing::debug;

/// Lists sub-folders of a repository path
pub struct FolderLister<'a, H: HostClient + ?Sized> {
    host: &'a H,
    repo: &'a RepoRef,
}

impl<'a, H: HostClient + ?Sized> FolderLister<'a, H> {
    pub fn new(host: &'a H, repo: &'a RepoRef) -> Self {
        FolderLister { host, repo }
    }

    /// Folders directly under `path` at `git_ref`.
    ///
    /// A path that does not exist has no folders; any other host failure is
    /// returned unchanged.
    pub async fn list(&self, path: &str, git_ref: &str) -> Result<Vec<DirEntry>> {
        match self.host.list_directory(self.repo, path, git_ref).await {
            Ok(entries) => Ok(entries
                .into_iter()
                .filter(|entry| entry.kind == EntryKind::Dir)
                .collect()),
            Err(e) if e.is_not_found() => {
                debug!(path = %path, "No such folder");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
