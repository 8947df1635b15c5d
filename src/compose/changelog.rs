use crate::compose::ChangelogComposer;
use crate::domain::{ClassifiedCommit, ReleaseDataset};

const TITLE: &str = "# Changelog\n\n";
/// Opening of every release heading, `## [<version>]`
const RELEASE_PREFIX: &str = "## [";

/// Markdown changelog with one `## [version]` section per release
#[derive(Debug, Clone)]
pub struct MarkdownChangelog {
    /// Web root used for compare and commit links
    pub web_url: String,
}

impl Default for MarkdownChangelog {
    fn default() -> Self {
        MarkdownChangelog {
            web_url: "https://github.com".to_string(),
        }
    }
}

impl MarkdownChangelog {
    pub fn new(web_url: impl Into<String>) -> Self {
        MarkdownChangelog {
            web_url: web_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Section for one release, ending in a single newline
    pub fn render_section(&self, data: &ReleaseDataset) -> String {
        let repo_url = format!("{}/{}/{}", self.web_url, data.org, data.repo);
        let mut out = format!(
            "{}{}]({}/compare/{}...{}) ({})\n",
            RELEASE_PREFIX, data.version, repo_url, data.previous_version, data.version, data.date
        );

        let sections: [(&str, &[ClassifiedCommit]); 3] = [
            ("Features", &data.commits.features),
            ("Bug Fixes", &data.commits.bug_fixes),
            ("Other Changes", &data.commits.other_commits),
        ];
        for (title, commits) in sections {
            if commits.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {}\n\n", title));
            for commit in commits {
                out.push_str(&format!(
                    "- {} ([{}]({}/commit/{}))\n",
                    commit.commit_name, commit.compact_commit_hash, repo_url, commit.commit_hash
                ));
            }
        }

        let visible: Vec<_> = data.visible_areas().collect();
        if !visible.is_empty() {
            out.push_str("\n### Affected Areas\n\n");
            for area in visible {
                out.push_str(&format!("- {} ({})\n", area.entity, area.area_type));
            }
        }

        out
    }
}

/// Start offset and text of every `## ` line
fn headings(text: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    let mut found = Vec::new();
    for line in text.split_inclusive('\n') {
        if line.starts_with("## ") {
            found.push((offset, line));
        }
        offset += line.len();
    }
    found
}

/// Place `section` for `version` into an existing changelog.
///
/// Only `## [version]` headings open a release section; other level-two
/// headings are prose and stay where they are. A section already present for
/// the version is replaced up to the next level-two heading. Otherwise the new
/// section goes above the newest release, or at the end when there is none.
pub fn merge_section(existing: Option<&str>, version: &str, section: &str) -> String {
    let existing = match existing {
        Some(text) if !text.trim().is_empty() => text,
        _ => return format!("{}{}", TITLE, section),
    };

    let own = format!("{}{}]", RELEASE_PREFIX, version);
    let headings = headings(existing);

    if let Some(pos) = headings.iter().position(|(_, line)| line.starts_with(&own)) {
        let start = headings[pos].0;
        let end = headings.get(pos + 1).map(|(o, _)| *o).unwrap_or(existing.len());
        let separator = if end < existing.len() { "\n" } else { "" };
        return format!(
            "{}{}{}{}",
            &existing[..start],
            section,
            separator,
            &existing[end..]
        );
    }

    let newest = headings
        .iter()
        .find(|(_, line)| line.starts_with(RELEASE_PREFIX));
    match newest {
        Some((start, _)) => format!(
            "{}{}\n{}",
            &existing[..*start],
            section,
            &existing[*start..]
        ),
        None => format!("{}\n\n{}", existing.trim_end(), section),
    }
}

impl ChangelogComposer for MarkdownChangelog {
    fn compose(&self, data: &ReleaseDataset, existing: Option<&str>) -> String {
        let section = self.render_section(data);
        merge_section(existing, &data.version, &section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AffectedArea, AreaType, CommitCategories, CommitKind};
    use chrono::NaiveDate;

    fn dataset(version: &str) -> ReleaseDataset {
        let mut commits = CommitCategories::default();
        commits.push(
            CommitKind::Feature,
            ClassifiedCommit::new("Add login", "1111111aaaa"),
        );
        commits.push(CommitKind::Other, ClassifiedCommit::new("Cleanup", "3333333cccc"));

        ReleaseDataset {
            version: version.to_string(),
            previous_version: "v1.2.0".to_string(),
            org: "acme".to_string(),
            repo: "shop".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            commits,
            affected_areas: vec![
                AffectedArea::new("Api", AreaType::Ecs, Some("service/api".to_string()), true),
                AffectedArea::new(
                    "Bar",
                    AreaType::Lambda,
                    Some("service/lambda/foo/functions/bar".to_string()),
                    false,
                ),
            ],
        }
    }

    #[test]
    fn test_render_section() {
        let section = MarkdownChangelog::default().render_section(&dataset("v1.3.0"));

        assert!(section.starts_with(
            "## [v1.3.0](https://github.com/acme/shop/compare/v1.2.0...v1.3.0) (2026-10-16)\n"
        ));
        assert!(section.contains(
            "### Features\n\n- Add login ([1111111](https://github.com/acme/shop/commit/1111111aaaa))\n"
        ));
        assert!(!section.contains("### Bug Fixes"));
        assert!(section.contains("### Other Changes"));
        assert!(section.contains("- Api (ECS)\n"));
        assert!(!section.contains("Bar"));
    }

    #[test]
    fn test_merge_into_missing_changelog() {
        let merged = merge_section(None, "v1.3.0", "## [v1.3.0]\n- a\n");
        assert_eq!(merged, "# Changelog\n\n## [v1.3.0]\n- a\n");
    }

    #[test]
    fn test_merge_above_previous_release() {
        let existing = "# Changelog\n\n## [v1.2.0]\n- old\n";
        let merged = merge_section(Some(existing), "v1.3.0", "## [v1.3.0]\n- new\n");
        assert_eq!(
            merged,
            "# Changelog\n\n## [v1.3.0]\n- new\n\n## [v1.2.0]\n- old\n"
        );
    }

    #[test]
    fn test_merge_replaces_same_version() {
        let existing = "# Changelog\n\n## [v1.3.0]\n- draft\n\n## [v1.2.0]\n- old\n";
        let merged = merge_section(Some(existing), "v1.3.0", "## [v1.3.0]\n- final\n");
        assert_eq!(
            merged,
            "# Changelog\n\n## [v1.3.0]\n- final\n\n## [v1.2.0]\n- old\n"
        );
    }

    #[test]
    fn test_merge_without_sections_appends() {
        let merged = merge_section(Some("# Notes\n"), "v1.0.0", "## [v1.0.0]\n");
        assert_eq!(merged, "# Notes\n\n## [v1.0.0]\n");
    }

    #[test]
    fn test_compose_twice_is_stable() {
        let composer = MarkdownChangelog::default();
        let data = dataset("v1.3.0");
        let once = composer.compose(&data, Some("# Changelog\n\n## [v1.2.0]\n- old\n"));
        let twice = composer.compose(&data, Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keeps_prose_headings_above_releases() {
        let existing = "# Changelog\n\n## Conventions\n\nSemver.\n\n## [v1.2.0]\n- old\n";
        let merged = merge_section(Some(existing), "v1.3.0", "## [v1.3.0]\n- new\n");
        assert_eq!(
            merged,
            "# Changelog\n\n## Conventions\n\nSemver.\n\n## [v1.3.0]\n- new\n\n## [v1.2.0]\n- old\n"
        );
    }

    #[test]
    fn test_merge_with_only_prose_headings_appends() {
        let existing = "# Changelog\n\n## Conventions\n\nSemver.\n";
        let merged = merge_section(Some(existing), "v1.0.0", "## [v1.0.0]\n");
        assert_eq!(
            merged,
            "# Changelog\n\n## Conventions\n\nSemver.\n\n## [v1.0.0]\n"
        );
    }
}
