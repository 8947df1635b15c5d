use crate::domain::capitalize;
use serde::{Deserialize, Serialize};

/// Message prefixes produced by merges and by the release process itself
const EXCLUDED_PREFIXES: [&str; 3] = ["Merge pull request", "Merge branch", "Auto generated"];

/// Changelog category of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitKind {
    Feature,
    BugFix,
    Other,
}

impl CommitKind {
    /// Map the lowercased token before the first `:` to a category
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "feat" => CommitKind::Feature,
            "fix" => CommitKind::BugFix,
            _ => CommitKind::Other,
        }
    }
}

/// Result of reading a `type: description` commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub kind: CommitKind,
    pub text: String,
}

impl ParsedMessage {
    /// Parse a free-text commit message.
    ///
    /// The message is split on every `:`. With at least one colon, the first
    /// part (trimmed, lowercased) picks the kind and the remaining parts are
    /// joined with spaces to form the text. Without a colon the whole
    /// message is the text and the kind is [`CommitKind::Other`]. The text is
    /// capitalized either way.
    pub fn parse(message: &str) -> Self {
        let parts: Vec<&str> = message.split(':').collect();

        if parts.len() > 1 {
            let tag = parts[0].trim().to_lowercase();
            let text = parts[1..].join(" ");

            ParsedMessage {
                kind: CommitKind::from_tag(&tag),
                text: capitalize(text.trim()),
            }
        } else {
            ParsedMessage {
                kind: CommitKind::Other,
                text: capitalize(message.trim()),
            }
        }
    }

    /// Whether a message is merge or release-process noise
    pub fn is_excluded(message: &str) -> bool {
        EXCLUDED_PREFIXES
            .iter()
            .any(|prefix| message.starts_with(prefix))
    }
}

/// One changelog line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCommit {
    pub commit_name: String,
    pub commit_hash: String,
    pub compact_commit_hash: String,
}

impl ClassifiedCommit {
    pub fn new(commit_name: impl Into<String>, commit_hash: impl Into<String>) -> Self {
        let commit_hash = commit_hash.into();
        let compact_commit_hash = commit_hash.chars().take(7).collect();

        ClassifiedCommit {
            commit_name: commit_name.into(),
            commit_hash,
            compact_commit_hash,
        }
    }
}
