use crate::domain::{AffectedArea, ClassifiedCommit, CommitKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Commits of a release split into changelog sections, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitCategories {
    pub features: Vec<ClassifiedCommit>,
    pub bug_fixes: Vec<ClassifiedCommit>,
    pub other_commits: Vec<ClassifiedCommit>,
}

impl CommitCategories {
    pub fn push(&mut self, kind: CommitKind, commit: ClassifiedCommit) {
        match kind {
            CommitKind::Feature => self.features.push(commit),
            CommitKind::BugFix => self.bug_fixes.push(commit),
            CommitKind::Other => self.other_commits.push(commit),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len() + self.bug_fixes.len() + self.other_commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the changelog and manifest composers need for one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDataset {
    pub version: String,
    pub previous_version: String,
    pub org: String,
    pub repo: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub commits: CommitCategories,
    pub affected_areas: Vec<AffectedArea>,
}

impl ReleaseDataset {
    /// Areas that should be surfaced in the changelog
    pub fn visible_areas(&self) -> impl Iterator<Item = &AffectedArea> {
        self.affected_areas.iter().filter(|area| area.visible)
    }
}
