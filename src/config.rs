use crate::domain::TagFormat;
use crate::error::{ReleaseError, Result};
use crate::host::RepoRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "release.toml";
/// File name looked up in the user config directory
pub const USER_CONFIG_FILE: &str = "release-train.toml";

/// Represents the complete configuration for release-train.
///
/// Contains tag naming, release behavior and host settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub host: HostConfig,
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_target_branch() -> String {
    "main".to_string()
}

fn default_commit_prefix() -> String {
    "Auto generated - New Release".to_string()
}

fn default_changelog_path() -> String {
    "CHANGELOG.md".to_string()
}

fn default_manifest_name() -> String {
    "package.json".to_string()
}

fn default_web_url() -> String {
    "https://github.com".to_string()
}

/// How release tags are named
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagsConfig {
    #[serde(default = "default_tag_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub suffix: String,

    /// Create a tag for the new version after publishing
    #[serde(default)]
    pub create_tag: bool,
}

impl Default for TagsConfig {
    fn default() -> Self {
        TagsConfig {
            prefix: default_tag_prefix(),
            suffix: String::new(),
            create_tag: false,
        }
    }
}

impl TagsConfig {
    pub fn format(&self) -> TagFormat {
        TagFormat::new(self.prefix.clone(), self.suffix.clone())
    }
}

/// What a release touches
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// Branch compared against the latest tag and receiving the release commit
    #[serde(default = "default_target_branch")]
    pub target_branch: String,

    /// Bump the major version regardless of branch name
    #[serde(default)]
    pub major: bool,

    #[serde(default = "default_commit_prefix")]
    pub commit_prefix: String,

    #[serde(default = "default_changelog_path")]
    pub changelog_path: String,

    /// Manifest file name, at the repository root and in every sub-project
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            target_branch: default_target_branch(),
            major: false,
            commit_prefix: default_commit_prefix(),
            changelog_path: default_changelog_path(),
            manifest_name: default_manifest_name(),
        }
    }
}

/// Hosting service endpoints
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HostConfig {
    /// REST API root for GitHub Enterprise Server; public GitHub when unset
    #[serde(default)]
    pub api_url: Option<String>,

    /// Web root used for links in the changelog
    #[serde(default = "default_web_url")]
    pub web_url: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            api_url: None,
            web_url: default_web_url(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in current directory
/// 3. `release-train.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

/// Identity of the run: which repository, which pull request, which credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
    pub token: String,
}

impl ReleaseContext {
    /// Build a context from optional inputs, failing on every absent field at once
    pub fn from_inputs(
        owner: Option<String>,
        repo: Option<String>,
        pr_number: Option<u64>,
        token: Option<String>,
    ) -> Result<Self> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let owner = present(owner);
        let repo = present(repo);
        let token = present(token);

        let mut missing = Vec::new();
        if owner.is_none() {
            missing.push("owner");
        }
        if repo.is_none() {
            missing.push("repo");
        }
        if pr_number.is_none() {
            missing.push("pr_number");
        }
        if token.is_none() {
            missing.push("token");
        }

        match (owner, repo, pr_number, token) {
            (Some(owner), Some(repo), Some(pr_number), Some(token)) => Ok(ReleaseContext {
                owner,
                repo,
                pr_number,
                token,
            }),
            _ => Err(ReleaseError::config(format!(
                "Missing required input: {}",
                missing.join(", ")
            ))),
        }
    }

    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(self.owner.clone(), self.repo.clone())
    }
}

impl fmt::Debug for ReleaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseContext")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("pr_number", &self.pr_number)
            .field("token", &"<redacted>")
            .finish()
    }
}
