use release_train::boundary::BoundaryWarning;
use release_train::ui;

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_no_new_commits_display() {
    let warning = BoundaryWarning::NoNewCommits {
        latest_tag: "v1.0.0".to_string(),
        target_branch: "main".to_string(),
    };

    assert_eq!(
        warning.to_string(),
        "No new commits on 'main' since tag 'v1.0.0'"
    );
}

#[test]
fn test_boundary_warning_version_not_bumped_display() {
    let warning = BoundaryWarning::VersionNotBumped {
        branch: "feature/login".to_string(),
        version: "v2.3.1".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("feature/login"),
        "Message should name the branch, got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("v2.3.1"),
        "Message should name the kept version, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_missing_manifest_display() {
    let warning = BoundaryWarning::MissingManifest {
        path: "service/api/package.json".to_string(),
    };

    assert_eq!(
        warning.to_string(),
        "Manifest 'service/api/package.json' not found, skipping"
    );
}

#[test]
fn test_boundary_warning_release_unchanged_shortens_hash() {
    let warning = BoundaryWarning::ReleaseUnchanged {
        version: "v1.3.0".to_string(),
        commit_hash: "abc1234def5678".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("abc1234"),
        "Message should contain shortened commit hash 'abc1234', got: {}",
        display_msg
    );
    assert!(
        !display_msg.contains("abc1234d"),
        "Message should not contain the full hash, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_release_unchanged_short_hash_kept() {
    let warning = BoundaryWarning::ReleaseUnchanged {
        version: "v1.3.0".to_string(),
        commit_hash: "abc".to_string(),
    };

    assert!(warning.to_string().contains("(at abc)"));
}

// ============================================================================
// Display integration
// ============================================================================

#[test]
fn test_display_boundary_warning_does_not_panic() {
    let warnings = vec![
        BoundaryWarning::NoNewCommits {
            latest_tag: "v1.0.0".to_string(),
            target_branch: "main".to_string(),
        },
        BoundaryWarning::MissingManifest {
            path: "package.json".to_string(),
        },
    ];

    for warning in &warnings {
        ui::display_boundary_warning(warning);
    }
}
