use crate::domain::Tag;
use crate::error::{ReleaseError, Result};
use crate::host::{
    CommitComparison, DirEntry, EntryKind, GitCommit, HostClient, HostCommit, RepoRef, TreeEntry,
};
use async_trait::async_trait;
use git2::{ObjectType, Oid};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Path to blob id
type Snapshot = BTreeMap<String, String>;

#[derive(Debug, Clone)]
struct MockCommit {
    tree: String,
    parents: Vec<String>,
    message: String,
}

#[derive(Default)]
struct MockState {
    blobs: HashMap<String, String>,
    trees: HashMap<String, Snapshot>,
    commits: HashMap<String, MockCommit>,
    /// Keyed relative to `refs/`, e.g. `heads/main`
    refs: BTreeMap<String, String>,
    /// Most recent first
    tags: Vec<Tag>,
    pull_requests: HashMap<u64, String>,
    calls: Vec<String>,
    failing: HashSet<String>,
    sequence: u64,
}

/// In-memory host for testing without network access
///
/// Blob ids are real git blob ids; tree and commit ids are content hashes of
/// a simplified encoding. Ref updates must be fast-forwards, like a
/// non-forced update on GitHub.
pub struct MockHost {
    state: Mutex<MockState>,
}

impl MockHost {
    /// Create a new empty mock host
    pub fn new() -> Self {
        MockHost {
            state: Mutex::new(MockState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Commit `files` on top of `branch`, creating the branch if needed
    pub fn commit_files(
        &mut self,
        branch: &str,
        message: &str,
        files: &[(&str, &str)],
    ) -> Result<String> {
        let state = self.state.get_mut().unwrap_or_else(|p| p.into_inner());
        let ref_name = format!("heads/{}", branch);

        let parent = state.refs.get(&ref_name).cloned();
        let mut snapshot = parent
            .as_ref()
            .and_then(|sha| state.commits.get(sha))
            .and_then(|commit| state.trees.get(&commit.tree))
            .cloned()
            .unwrap_or_default();

        for (path, content) in files {
            let blob = state.store_blob(content)?;
            snapshot.insert(path.to_string(), blob);
        }

        let tree = state.store_tree(snapshot)?;
        let parents: Vec<String> = parent.into_iter().collect();
        let sha = state.store_commit(message, &tree, &parents)?;
        state.refs.insert(ref_name, sha.clone());
        Ok(sha)
    }

    /// Tag the current head of `branch`, making it the most recent tag
    pub fn tag_branch_head(&mut self, tag: &str, branch: &str) {
        let state = self.state.get_mut().unwrap_or_else(|p| p.into_inner());
        if let Some(sha) = state.refs.get(&format!("heads/{}", branch)).cloned() {
            state.refs.insert(format!("tags/{}", tag), sha.clone());
            state.tags.insert(0, Tag::new(tag, sha));
        }
    }

    /// Register an open pull request
    pub fn add_pull_request(&mut self, number: u64, head_ref: impl Into<String>) {
        let state = self.state.get_mut().unwrap_or_else(|p| p.into_inner());
        state.pull_requests.insert(number, head_ref.into());
    }

    /// Make every later call of `operation` fail
    pub fn fail_on(&mut self, operation: &str) {
        let state = self.state.get_mut().unwrap_or_else(|p| p.into_inner());
        state.failing.insert(operation.to_string());
    }

    /// Names of the operations served so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// How many times `operation` was served
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == operation).count()
    }

    /// Commit a branch points at
    pub fn branch_head(&self, branch: &str) -> Option<String> {
        self.lock().refs.get(&format!("heads/{}", branch)).cloned()
    }

    /// Commit a tag points at
    pub fn tag_target(&self, tag: &str) -> Option<String> {
        self.lock().refs.get(&format!("tags/{}", tag)).cloned()
    }

    pub fn commit_parents(&self, sha: &str) -> Option<Vec<String>> {
        self.lock().commits.get(sha).map(|c| c.parents.clone())
    }

    pub fn commit_message(&self, sha: &str) -> Option<String> {
        self.lock().commits.get(sha).map(|c| c.message.clone())
    }

    pub fn commit_count(&self) -> usize {
        self.lock().commits.len()
    }

    /// Path to blob id map of the tree a commit points at
    pub fn commit_tree_entries(&self, sha: &str) -> Option<BTreeMap<String, String>> {
        let state = self.lock();
        let commit = state.commits.get(sha)?;
        state.trees.get(&commit.tree).cloned()
    }

    /// File content at the head of `branch`
    pub fn file_at(&self, branch: &str, path: &str) -> Option<String> {
        let state = self.lock();
        let snapshot = state.snapshot_of(&format!("heads/{}", branch))?;
        let blob = snapshot.get(path)?;
        state.blobs.get(blob).cloned()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

fn hash(kind: ObjectType, data: &str) -> Result<String> {
    Oid::hash_object(kind, data.as_bytes())
        .map(|oid| oid.to_string())
        .map_err(|e| ReleaseError::host("hash object", e.to_string()))
}

impl MockState {
    fn record(&mut self, operation: &str) -> Result<()> {
        self.calls.push(operation.to_string());
        if self.failing.contains(operation) {
            return Err(ReleaseError::host(operation, "injected failure"));
        }
        Ok(())
    }

    fn store_blob(&mut self, content: &str) -> Result<String> {
        let sha = hash(ObjectType::Blob, content)?;
        self.blobs.insert(sha.clone(), content.to_string());
        Ok(sha)
    }

    fn store_tree(&mut self, snapshot: Snapshot) -> Result<String> {
        let encoded: String = snapshot
            .iter()
            .map(|(path, blob)| format!("100644 blob {}\t{}\n", blob, path))
            .collect();
        let sha = hash(ObjectType::Tree, &encoded)?;
        self.trees.insert(sha.clone(), snapshot);
        Ok(sha)
    }

    fn store_commit(&mut self, message: &str, tree: &str, parents: &[String]) -> Result<String> {
        self.sequence += 1;
        let mut encoded = format!("tree {}\n", tree);
        for parent in parents {
            encoded.push_str(&format!("parent {}\n", parent));
        }
        encoded.push_str(&format!("sequence {}\n\n{}", self.sequence, message));

        let sha = hash(ObjectType::Commit, &encoded)?;
        self.commits.insert(
            sha.clone(),
            MockCommit {
                tree: tree.to_string(),
                parents: parents.to_vec(),
                message: message.to_string(),
            },
        );
        Ok(sha)
    }

    /// Resolve a ref name or a commit id to a commit id
    fn resolve(&self, rev: &str) -> Option<String> {
        if self.commits.contains_key(rev) {
            return Some(rev.to_string());
        }
        self.refs
            .get(&format!("heads/{}", rev))
            .or_else(|| self.refs.get(&format!("tags/{}", rev)))
            .or_else(|| self.refs.get(rev))
            .cloned()
    }

    fn snapshot_of(&self, rev: &str) -> Option<&Snapshot> {
        let sha = self.resolve(rev)?;
        let commit = self.commits.get(&sha)?;
        self.trees.get(&commit.tree)
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut queue = VecDeque::from([descendant.to_string()]);
        let mut seen = HashSet::new();

        while let Some(sha) = queue.pop_front() {
            if sha == ancestor {
                return true;
            }
            if !seen.insert(sha.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&sha) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        false
    }
}

#[async_trait]
impl HostClient for MockHost {
    async fn list_tags(&self, _repo: &RepoRef) -> Result<Vec<Tag>> {
        let mut state = self.lock();
        state.record("list_tags")?;
        Ok(state.tags.clone())
    }

    async fn compare_commits(
        &self,
        _repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<CommitComparison> {
        let mut state = self.lock();
        state.record("compare_commits")?;

        let base_sha = state
            .resolve(base)
            .ok_or_else(|| ReleaseError::not_found(base.to_string()))?;
        let head_sha = state
            .resolve(head)
            .ok_or_else(|| ReleaseError::not_found(head.to_string()))?;

        // First-parent walk from head back to base
        let mut commits = Vec::new();
        let mut cursor = Some(head_sha.clone());
        while let Some(sha) = cursor {
            if sha == base_sha {
                break;
            }
            let commit = match state.commits.get(&sha) {
                Some(commit) => commit,
                None => break,
            };
            commits.push(HostCommit {
                sha: sha.clone(),
                message: commit.message.clone(),
            });
            cursor = commit.parents.first().cloned();
        }

        let empty = Snapshot::new();
        let before = state.snapshot_of(&base_sha).unwrap_or(&empty);
        let after = state.snapshot_of(&head_sha).unwrap_or(&empty);
        let paths: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
        let files = paths
            .into_iter()
            .filter(|path| before.get(*path) != after.get(*path))
            .cloned()
            .collect();

        Ok(CommitComparison { commits, files })
    }

    async fn pull_request_head_ref(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> Result<Option<String>> {
        let mut state = self.lock();
        state.record("pull_request_head_ref")?;
        Ok(state.pull_requests.get(&number).cloned())
    }

    async fn get_ref(&self, _repo: &RepoRef, ref_name: &str) -> Result<String> {
        let mut state = self.lock();
        state.record("get_ref")?;
        state
            .refs
            .get(ref_name)
            .cloned()
            .ok_or_else(|| ReleaseError::not_found(ref_name.to_string()))
    }

    async fn get_commit(&self, _repo: &RepoRef, sha: &str) -> Result<GitCommit> {
        let mut state = self.lock();
        state.record("get_commit")?;
        let commit = state
            .commits
            .get(sha)
            .ok_or_else(|| ReleaseError::not_found(sha.to_string()))?;

        Ok(GitCommit {
            sha: sha.to_string(),
            tree_sha: commit.tree.clone(),
            parents: commit.parents.clone(),
        })
    }

    async fn create_blob(&self, _repo: &RepoRef, content: &str) -> Result<String> {
        let mut state = self.lock();
        state.record("create_blob")?;
        state.store_blob(content)
    }

    async fn create_tree(
        &self,
        _repo: &RepoRef,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String> {
        let mut state = self.lock();
        state.record("create_tree")?;

        let mut snapshot = state
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| ReleaseError::host("create tree", format!("unknown base tree {}", base_tree)))?;

        for entry in entries {
            if !state.blobs.contains_key(&entry.sha) {
                return Err(ReleaseError::host(
                    "create tree",
                    format!("unknown blob {} for {}", entry.sha, entry.path),
                ));
            }
            snapshot.insert(entry.path.clone(), entry.sha.clone());
        }

        state.store_tree(snapshot)
    }

    async fn create_commit(
        &self,
        _repo: &RepoRef,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String> {
        let mut state = self.lock();
        state.record("create_commit")?;

        if !state.trees.contains_key(tree) {
            return Err(ReleaseError::host("create commit", format!("unknown tree {}", tree)));
        }
        if let Some(missing) = parents.iter().find(|p| !state.commits.contains_key(*p)) {
            return Err(ReleaseError::host(
                "create commit",
                format!("unknown parent {}", missing),
            ));
        }

        state.store_commit(message, tree, parents)
    }

    async fn update_ref(&self, _repo: &RepoRef, ref_name: &str, sha: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("update_ref")?;

        let current = state
            .refs
            .get(ref_name)
            .cloned()
            .ok_or_else(|| ReleaseError::not_found(ref_name.to_string()))?;
        if !state.commits.contains_key(sha) {
            return Err(ReleaseError::host("update ref", format!("unknown commit {}", sha)));
        }
        if !state.is_ancestor(&current, sha) {
            return Err(ReleaseError::host(
                "update ref",
                format!("Update of {} is not a fast forward", ref_name),
            ));
        }

        state.refs.insert(ref_name.to_string(), sha.to_string());
        Ok(())
    }

    async fn create_ref(&self, _repo: &RepoRef, ref_name: &str, sha: &str) -> Result<()> {
        let mut state = self.lock();
        state.record("create_ref")?;

        let short = ref_name.strip_prefix("refs/").ok_or_else(|| {
            ReleaseError::host("create ref", format!("'{}' is not fully qualified", ref_name))
        })?;
        if state.refs.contains_key(short) {
            return Err(ReleaseError::host(
                "create ref",
                "Reference already exists".to_string(),
            ));
        }

        state.refs.insert(short.to_string(), sha.to_string());
        if let Some(tag) = short.strip_prefix("tags/") {
            state.tags.insert(0, Tag::new(tag, sha));
        }
        Ok(())
    }

    async fn list_directory(
        &self,
        _repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<DirEntry>> {
        let mut state = self.lock();
        state.record("list_directory")?;

        let snapshot = state
            .snapshot_of(git_ref)
            .ok_or_else(|| ReleaseError::not_found(git_ref.to_string()))?;
        let prefix = format!("{}/", path.trim_end_matches('/'));

        let mut children: BTreeMap<String, EntryKind> = BTreeMap::new();
        for file in snapshot.keys() {
            if let Some(rest) = file.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    Some((dir, _)) => {
                        children.insert(dir.to_string(), EntryKind::Dir);
                    }
                    None => {
                        children.entry(rest.to_string()).or_insert(EntryKind::File);
                    }
                }
            }
        }

        if children.is_empty() {
            return Err(ReleaseError::not_found(path.to_string()));
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| DirEntry {
                path: format!("{}{}", prefix, name),
                name,
                kind,
            })
            .collect())
    }

    async fn get_file(&self, _repo: &RepoRef, path: &str, git_ref: &str) -> Result<String> {
        let mut state = self.lock();
        state.record("get_file")?;

        state
            .snapshot_of(git_ref)
            .and_then(|snapshot| snapshot.get(path))
            .and_then(|blob| state.blobs.get(blob))
            .cloned()
            .ok_or_else(|| ReleaseError::not_found(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoRef {
        RepoRef::new("acme", "shop")
    }

    #[test]
    fn test_commit_files_moves_branch() {
        let mut host = MockHost::new();
        let first = host.commit_files("main", "init", &[("README.md", "hi")]).unwrap();
        let second = host.commit_files("main", "feat: more", &[("src/a.js", "a")]).unwrap();

        assert_eq!(host.branch_head("main"), Some(second.clone()));
        assert_eq!(host.commit_parents(&second), Some(vec![first]));
        assert_eq!(host.file_at("main", "README.md").as_deref(), Some("hi"));
    }

    #[test]
    fn test_blob_ids_are_git_blob_ids() {
        let mut host = MockHost::new();
        host.commit_files("main", "init", &[("hello.txt", "hello\n")]).unwrap();
        let head = host.branch_head("main").unwrap();
        let entries = host.commit_tree_entries(&head).unwrap();
        // `git hash-object` of "hello\n"
        assert_eq!(
            entries.get("hello.txt").map(String::as_str),
            Some("ce013625030ba8dba906f756967f9e9ca394464a")
        );
    }

    #[tokio::test]
    async fn test_created_objects_keep_distinct_ids() {
        let mut host = MockHost::new();
        host.commit_files("main", "init", &[("README.md", "hi")]).unwrap();

        let first = host.create_blob(&repo(), "one").await.unwrap();
        let second = host.create_blob(&repo(), "two").await.unwrap();
        assert_eq!(first.len(), 40);
        assert_ne!(first, second);

        let head = host.branch_head("main").unwrap();
        let tree = host.get_commit(&repo(), &head).await.unwrap().tree_sha;
        let entries = vec![
            TreeEntry::blob("one.txt", first.clone()),
            TreeEntry::blob("two.txt", second.clone()),
        ];
        let new_tree = host.create_tree(&repo(), &tree, &entries).await.unwrap();
        let commit = host
            .create_commit(&repo(), "both", &new_tree, &[head])
            .await
            .unwrap();

        let stored = host.commit_tree_entries(&commit).unwrap();
        assert_eq!(stored.get("one.txt"), Some(&first));
        assert_eq!(stored.get("two.txt"), Some(&second));
        assert!(!stored.values().any(String::is_empty));
    }

    #[tokio::test]
    async fn test_compare_lists_newest_first() {
        let mut host = MockHost::new();
        host.commit_files("main", "init", &[("README.md", "hi")]).unwrap();
        host.tag_branch_head("v1.0.0", "main");
        host.commit_files("main", "feat: one", &[("a.txt", "1")]).unwrap();
        host.commit_files("main", "fix: two", &[("b.txt", "2")]).unwrap();

        let compare = host.compare_commits(&repo(), "v1.0.0", "main").await.unwrap();
        let messages: Vec<_> = compare.commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["fix: two", "feat: one"]);
        assert_eq!(compare.files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_update_ref_requires_fast_forward() {
        let mut host = MockHost::new();
        let base = host.commit_files("main", "init", &[("a", "1")]).unwrap();
        host.commit_files("main", "next", &[("a", "2")]).unwrap();

        let err = host
            .update_ref(&repo(), "heads/main", &base)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a fast forward"));
    }

    #[tokio::test]
    async fn test_list_directory() {
        let mut host = MockHost::new();
        host.commit_files(
            "main",
            "init",
            &[
                ("service/lambda/foo/layers/common/index.js", "x"),
                ("service/lambda/foo/layers/auth/index.js", "y"),
                ("service/lambda/foo/layers/README.md", "z"),
            ],
        )
        .unwrap();

        let entries = host
            .list_directory(&repo(), "service/lambda/foo/layers", "main")
            .await
            .unwrap();
        let dirs: Vec<_> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Dir)
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(
            dirs,
            vec!["service/lambda/foo/layers/auth", "service/lambda/foo/layers/common"]
        );

        let missing = host
            .list_directory(&repo(), "service/lambda/bar/layers", "main")
            .await
            .unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let mut host = MockHost::new();
        host.fail_on("list_tags");
        assert!(host.list_tags(&repo()).await.is_err());
        assert_eq!(host.call_count("list_tags"), 1);
    }

    #[tokio::test]
    async fn test_create_ref_registers_tag() {
        let mut host = MockHost::new();
        let head = host.commit_files("main", "init", &[("a", "1")]).unwrap();
        host.create_ref(&repo(), "refs/tags/v2.0.0", &head)
            .await
            .unwrap();

        assert_eq!(host.tag_target("v2.0.0"), Some(head));
        let tags = host.list_tags(&repo()).await.unwrap();
        assert_eq!(tags[0].name, "v2.0.0");
    }
}
