//! Main release workflow
//!
//! Everything between reading the host and publishing to it lives here, so
//! the binary only parses arguments, prints, and picks the exit code.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::analyzer::{AreaClassifier, CommitClassifier, VersionResolver};
use crate::boundary::BoundaryWarning;
use crate::compose::{manifest_paths, ChangelogComposer, JsonManifest, ManifestUpdater, MarkdownChangelog};
use crate::config::{Config, ReleaseContext};
use crate::domain::{ReleaseDataset, Tag, VersionBump};
use crate::error::{ReleaseError, Result};
use crate::host::{HostClient, RepoRef};
use crate::publish::{AtomicCommitBuilder, FileUpload, FolderLister, PublishOutcome};

/// Per-run switches, on top of the file configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOptions {
    /// Compute and report, write nothing
    pub dry_run: bool,

    /// Force a major bump
    pub major: bool,

    /// Branch name to read the bump rule from instead of the pull request's
    pub branch: Option<String>,

    /// Date stamped on the changelog section
    pub date: NaiveDate,
}

impl ReleaseOptions {
    pub fn new(date: NaiveDate) -> Self {
        ReleaseOptions {
            dry_run: false,
            major: false,
            branch: None,
            date,
        }
    }

    /// Options dated with today's UTC date
    pub fn today() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

/// What a run computed and did
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseReport {
    pub dataset: ReleaseDataset,
    pub bump: VersionBump,
    /// Paths of every file in the release commit, changelog first
    pub files: Vec<String>,
    /// `None` on a dry run
    pub outcome: Option<PublishOutcome>,
    pub tag_created: bool,
    pub warnings: Vec<BoundaryWarning>,
    pub dry_run: bool,
}

/// Run a release with the default changelog and manifest composers
pub async fn run_release<H: HostClient + ?Sized>(
    host: &H,
    ctx: &ReleaseContext,
    config: &Config,
    options: &ReleaseOptions,
) -> Result<ReleaseReport> {
    let changelog = MarkdownChangelog::new(config.host.web_url.clone());
    run_release_with(host, ctx, config, options, &changelog, &JsonManifest).await
}

/// Run a release with caller supplied composers.
///
/// Steps, each depending on the one before:
/// 1. Resolve the new version from the latest tag and the pull request branch
/// 2. Classify commits and changed files since that tag
/// 3. Compose the changelog and every manifest
/// 4. Publish them as one commit on the target branch, then optionally tag it
pub async fn run_release_with<H, C, M>(
    host: &H,
    ctx: &ReleaseContext,
    config: &Config,
    options: &ReleaseOptions,
    changelog: &C,
    manifests: &M,
) -> Result<ReleaseReport>
where
    H: HostClient + ?Sized,
    C: ChangelogComposer + ?Sized,
    M: ManifestUpdater + ?Sized,
{
    let repo = ctx.repo_ref();
    let target = config.release.target_branch.as_str();
    let mut warnings = Vec::new();

    let tags = host.list_tags(&repo).await?;
    let latest = Tag::latest(&tags)
        .ok_or_else(|| {
            ReleaseError::config("Repository has no tags; create an initial release tag first")
        })?
        .clone();

    let branch = match &options.branch {
        Some(branch) => branch.clone(),
        None => host
            .pull_request_head_ref(&repo, ctx.pr_number)
            .await?
            .ok_or_else(|| {
                ReleaseError::config(format!(
                    "Pull request #{} not found; cannot read the branch name",
                    ctx.pr_number
                ))
            })?,
    };

    let resolver = VersionResolver::new(config.tags.format(), config.release.major || options.major);
    let resolved = resolver.resolve(&latest.name, &branch)?;
    info!(
        branch = %branch,
        current = %resolved.current_version,
        new = %resolved.new_version,
        bump = %resolved.bump,
        "Resolved release version"
    );
    if resolved.bump == VersionBump::None {
        warnings.push(BoundaryWarning::VersionNotBumped {
            branch: branch.clone(),
            version: resolved.new_version.clone(),
        });
    }

    let comparison = host
        .compare_commits(&repo, &latest.commit_sha, target)
        .await?;
    if comparison.commits.is_empty() {
        warnings.push(BoundaryWarning::NoNewCommits {
            latest_tag: latest.name.clone(),
            target_branch: target.to_string(),
        });
    }

    let commits = CommitClassifier::classify_newest_first(&comparison.commits);
    let changed: Vec<&String> = comparison
        .files
        .iter()
        .filter(|path| !is_release_output(path, config))
        .collect();
    let affected_areas = AreaClassifier::classify(&changed);
    debug!(
        commits = commits.len(),
        files = changed.len(),
        areas = affected_areas.len(),
        "Classified commit range"
    );

    let dataset = ReleaseDataset {
        version: resolved.new_version.clone(),
        previous_version: resolved.current_version.clone(),
        org: ctx.owner.clone(),
        repo: ctx.repo.clone(),
        date: options.date,
        commits,
        affected_areas,
    };

    let mut uploads = Vec::new();

    let existing_changelog = read_optional(host, &repo, &config.release.changelog_path, target).await?;
    uploads.push(FileUpload::new(
        config.release.changelog_path.clone(),
        changelog.compose(&dataset, existing_changelog.as_deref()),
    ));

    let lister = FolderLister::new(host, &repo);
    let manifest_version = resolved.triple.to_string();
    for path in manifest_paths(&lister, &dataset.affected_areas, &config.release.manifest_name, target).await? {
        match read_optional(host, &repo, &path, target).await? {
            Some(existing) => {
                let updated = manifests.update(&path, &existing, &manifest_version)?;
                uploads.push(FileUpload::new(path, updated));
            }
            None => {
                warn!(path = %path, "Manifest missing");
                warnings.push(BoundaryWarning::MissingManifest { path });
            }
        }
    }

    let files: Vec<String> = uploads.iter().map(|upload| upload.path.clone()).collect();

    if options.dry_run {
        info!(files = files.len(), "Dry run, nothing published");
        return Ok(ReleaseReport {
            dataset,
            bump: resolved.bump,
            files,
            outcome: None,
            tag_created: false,
            warnings,
            dry_run: true,
        });
    }

    let builder = AtomicCommitBuilder::new(host, &repo, config.release.commit_prefix.clone());
    let outcome = builder.publish(&uploads, target, &resolved.new_version).await?;
    if let PublishOutcome::Unchanged { commit_sha } = &outcome {
        warnings.push(BoundaryWarning::ReleaseUnchanged {
            version: resolved.new_version.clone(),
            commit_hash: commit_sha.clone(),
        });
    }

    let tag_created = config.tags.create_tag
        && create_release_tag(host, &repo, &tags, &resolved.new_version, outcome.commit_sha()).await?;

    Ok(ReleaseReport {
        dataset,
        bump: resolved.bump,
        files,
        outcome: Some(outcome),
        tag_created,
        warnings,
        dry_run: false,
    })
}

/// Files the release itself rewrites at the repository root.
///
/// They are left out of area classification so a re-run over a range that
/// already holds a release commit sees the same areas. The cost: a developer
/// edit to the root manifest or changelog no longer shows up as an `Other`
/// area in the changelog.
fn is_release_output(path: &str, config: &Config) -> bool {
    path == config.release.changelog_path || path == config.release.manifest_name
}

/// File content at `git_ref`, `None` when the host has no such file
async fn read_optional<H: HostClient + ?Sized>(
    host: &H,
    repo: &RepoRef,
    path: &str,
    git_ref: &str,
) -> Result<Option<String>> {
    match host.get_file(repo, path, git_ref).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Tag `commit_sha` as `version` unless a tag of that name is already listed
async fn create_release_tag<H: HostClient + ?Sized>(
    host: &H,
    repo: &RepoRef,
    tags: &[Tag],
    version: &str,
    commit_sha: &str,
) -> Result<bool> {
    if tags.iter().any(|tag| tag.name == version) {
        debug!(tag = %version, "Tag already exists");
        return Ok(false);
    }

    host.create_ref(repo, &format!("refs/tags/{}", version), commit_sha)
        .await?;
    info!(tag = %version, commit = %commit_sha, "Created release tag");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_outputs_are_root_paths_only() {
        let config = Config::default();
        assert!(is_release_output("CHANGELOG.md", &config));
        assert!(is_release_output("package.json", &config));
        assert!(!is_release_output("service/api/package.json", &config));
        assert!(!is_release_output("docs/CHANGELOG.md", &config));
    }

    #[test]
    fn test_root_manifest_edit_is_not_an_area() {
        let config = Config::default();
        let changed = ["package.json", "CHANGELOG.md", "README.md"];
        let kept: Vec<&str> = changed
            .iter()
            .copied()
            .filter(|path| !is_release_output(path, &config))
            .collect();

        let areas = AreaClassifier::classify(&kept);
        let entities: Vec<&str> = areas.iter().map(|a| a.entity.as_str()).collect();
        assert_eq!(entities, vec!["README.md"]);
    }

    #[test]
    fn test_options_default_to_a_real_run() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let options = ReleaseOptions::new(date);
        assert!(!options.dry_run);
        assert!(!options.major);
        assert_eq!(options.branch, None);
        assert_eq!(options.date, date);
    }
}
