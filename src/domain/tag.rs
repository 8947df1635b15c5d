use crate::domain::VersionTriple;
use serde::{Deserialize, Serialize};

/// A release tag as listed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// Commit the tag points at
    pub commit_sha: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            commit_sha: commit_sha.into(),
        }
    }

    /// The most recent tag of a host listing.
    ///
    /// Listings arrive most-recent-first, so this is simply the head element.
    pub fn latest(tags: &[Tag]) -> Option<&Tag> {
        tags.first()
    }
}

/// Prefix and suffix wrapped around a version when naming a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFormat {
    pub prefix: String,
    pub suffix: String,
}

impl TagFormat {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        TagFormat {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Example: prefix="v", suffix="-stable", version=1.2.3 -> "v1.2.3-stable"
    pub fn format(&self, version: &VersionTriple) -> String {
        format!("{}{}{}", self.prefix, version, self.suffix)
    }
}

impl Default for TagFormat {
    fn default() -> Self {
        TagFormat::new("v", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_is_first_listed() {
        let tags = vec![Tag::new("v2.0.0", "bbb"), Tag::new("v1.0.0", "aaa")];
        assert_eq!(Tag::latest(&tags).unwrap().name, "v2.0.0");
    }

    #[test]
    fn test_latest_of_empty_listing() {
        assert!(Tag::latest(&[]).is_none());
    }

    #[test]
    fn test_format_default() {
        let format = TagFormat::default();
        assert_eq!(format.format(&VersionTriple::new(1, 2, 3)), "v1.2.3");
    }

    #[test]
    fn test_format_with_suffix() {
        let format = TagFormat::new("release-", "-lts");
        assert_eq!(
            format.format(&VersionTriple::new(4, 0, 0)),
            "release-4.0.0-lts"
        );
    }
}
