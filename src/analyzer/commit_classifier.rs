use crate::domain::{ClassifiedCommit, CommitCategories, ParsedMessage};
use crate::host::HostCommit;

/// Sorts a commit range into changelog sections
pub struct CommitClassifier;

impl CommitClassifier {
    /// Classify commits given oldest first.
    ///
    /// Merge and release-process commits are dropped before anything else.
    /// Every section keeps the input order.
    pub fn classify(commits: &[HostCommit]) -> CommitCategories {
        let mut categories = CommitCategories::default();

        for commit in commits {
            if ParsedMessage::is_excluded(&commit.message) {
                continue;
            }

            let parsed = ParsedMessage::parse(&commit.message);
            categories.push(parsed.kind, ClassifiedCommit::new(parsed.text, &commit.sha));
        }

        categories
    }

    /// Classify commits as the host lists them, newest first
    pub fn classify_newest_first(commits: &[HostCommit]) -> CommitCategories {
        let chronological: Vec<HostCommit> = commits.iter().rev().cloned().collect();
        Self::classify(&chronological)
    }
}
