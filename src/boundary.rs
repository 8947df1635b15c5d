use std::fmt;

/// Non-fatal conditions met while cutting a release.
/// These are reported to the user and the run carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No commits between the latest tag and the target branch
    NoNewCommits {
        latest_tag: String,
        target_branch: String,
    },
    /// Branch name carries no bump rule, the version stays as it is
    VersionNotBumped { branch: String, version: String },
    /// A manifest the release should bump does not exist on the branch
    MissingManifest { path: String },
    /// The branch already holds this release's content, nothing was committed
    ReleaseUnchanged { version: String, commit_hash: String },
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                latest_tag,
                target_branch,
            } => write!(
                f,
                "No new commits on '{}' since tag '{}'",
                target_branch, latest_tag
            ),
            BoundaryWarning::VersionNotBumped { branch, version } => write!(
                f,
                "Branch '{}' is neither flight/ nor hotfix/, keeping version {}",
                branch, version
            ),
            BoundaryWarning::MissingManifest { path } => {
                write!(f, "Manifest '{}' not found, skipping", path)
            }
            BoundaryWarning::ReleaseUnchanged {
                version,
                commit_hash,
            } => write!(
                f,
                "Release {} already published (at {}), nothing to commit",
                version,
                short_hash(commit_hash)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("0123456789abcdef"), "0123456");
        assert_eq!(short_hash("abc"), "abc");
    }
}
