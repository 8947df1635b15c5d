//! Pure formatting functions for UI output.
//!
//! `render_*` functions build the text so it can be tested; `display_*`
//! functions print it.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::ReleaseReport;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Summary of what a release changes, one fact per line
pub fn render_release_plan(report: &ReleaseReport) -> String {
    let mut lines = vec![
        format!(
            "Version: {} -> {} ({})",
            report.dataset.previous_version, report.dataset.version, report.bump
        ),
        format!(
            "Commits: {} features, {} bug fixes, {} other",
            report.dataset.commits.features.len(),
            report.dataset.commits.bug_fixes.len(),
            report.dataset.commits.other_commits.len()
        ),
    ];

    let areas: Vec<String> = report
        .dataset
        .visible_areas()
        .map(|area| format!("{} ({})", area.entity, area.area_type))
        .collect();
    if areas.is_empty() {
        lines.push("Affected areas: none".to_string());
    } else {
        lines.push(format!("Affected areas: {}", areas.join(", ")));
    }

    lines.push("Files:".to_string());
    for file in &report.files {
        lines.push(format!("  - {}", file));
    }

    lines.join("\n")
}

/// Print the release plan under a bold heading
pub fn display_release_plan(report: &ReleaseReport) {
    let heading = if report.dry_run {
        "Release plan (dry run)"
    } else {
        "Release plan"
    };
    println!("\n{}", style(heading).bold());
    for line in render_release_plan(report).lines() {
        println!("  {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AffectedArea, AreaType, ClassifiedCommit, CommitCategories, CommitKind, ReleaseDataset,
        VersionBump,
    };
    use chrono::NaiveDate;

    fn report() -> ReleaseReport {
        let mut commits = CommitCategories::default();
        commits.push(CommitKind::Feature, ClassifiedCommit::new("Add login", "1234567abc"));
        commits.push(CommitKind::Other, ClassifiedCommit::new("Tidy", "7654321abc"));

        ReleaseReport {
            dataset: ReleaseDataset {
                version: "v1.3.0".to_string(),
                previous_version: "v1.2.0".to_string(),
                org: "acme".to_string(),
                repo: "shop".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
                commits,
                affected_areas: vec![AffectedArea::new(
                    "Api",
                    AreaType::Ecs,
                    Some("service/api".to_string()),
                    true,
                )],
            },
            bump: VersionBump::Minor,
            files: vec!["CHANGELOG.md".to_string(), "package.json".to_string()],
            outcome: None,
            tag_created: false,
            warnings: Vec::new(),
            dry_run: true,
        }
    }

    #[test]
    fn test_render_release_plan() {
        let plan = render_release_plan(&report());
        assert_eq!(
            plan,
            "Version: v1.2.0 -> v1.3.0 (minor)\n\
             Commits: 1 features, 0 bug fixes, 1 other\n\
             Affected areas: Api (ECS)\n\
             Files:\n  - CHANGELOG.md\n  - package.json"
        );
    }

    #[test]
    fn test_render_release_plan_without_areas() {
        let mut report = report();
        report.dataset.affected_areas.clear();
        assert!(render_release_plan(&report).contains("Affected areas: none"));
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_boundary_warning(&BoundaryWarning::MissingManifest {
            path: "service/api/package.json".to_string(),
        });
        display_release_plan(&report());
    }
}
