use crate::domain::{BranchPrefix, TagFormat, VersionBump, VersionTriple};
use crate::error::Result;

/// Outcome of version resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Formatted name of the release being cut
    pub new_version: String,
    /// Latest tag name, verbatim
    pub current_version: String,
    pub bump: VersionBump,
    pub triple: VersionTriple,
}

/// Derives the next release version from the latest tag and the branch name
pub struct VersionResolver {
    format: TagFormat,
    major_release: bool,
}

impl VersionResolver {
    pub fn new(format: TagFormat, major_release: bool) -> Self {
        VersionResolver {
            format,
            major_release,
        }
    }

    /// Bump rule, highest priority first: major flag, flight, hotfix, none
    pub fn bump_for(&self, branch_name: &str) -> VersionBump {
        if self.major_release {
            return VersionBump::Major;
        }

        match BranchPrefix::from_branch(branch_name) {
            BranchPrefix::Flight => VersionBump::Minor,
            BranchPrefix::Hotfix => VersionBump::Patch,
            BranchPrefix::Other(_) => VersionBump::None,
        }
    }

    pub fn resolve(&self, latest_tag: &str, branch_name: &str) -> Result<ResolvedVersion> {
        let current = VersionTriple::parse(latest_tag)?;
        let bump = self.bump_for(branch_name);
        let triple = current.bump(bump)?;

        Ok(ResolvedVersion {
            new_version: self.format.format(&triple),
            current_version: latest_tag.to_string(),
            bump,
            triple,
        })
    }
}
