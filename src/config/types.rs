use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_DOWNLOAD_URL: &str = "https://github.com";
pub const DEFAULT_GITLAB_API_URL: &str = "https://gitlab.com/api/v4";
pub const DEFAULT_ARTIFACT_PATTERN: &str = "*release*.apk";
pub const DEFAULT_BUILD_ARGS: &str = "clean build";
pub const DEFAULT_KEY_ALIAS: &str = "apkforge";
pub const DEFAULT_KEY_VALIDITY_DAYS: u32 = 10000;

/// How to pick the artifact when the build tree holds several matches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSelection {
    /// More than one match is an error
    #[default]
    Strict,
    /// Take the first match in sorted traversal order
    First,
}

/// Settings read from apkforge.yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the GitHub REST API
    pub github_api_url: String,

    /// Base URL for release source archives
    pub github_download_url: String,

    /// Base URL of the GitLab REST API
    pub gitlab_api_url: String,

    /// Glob matched against file names in the build tree
    pub artifact_pattern: String,

    pub artifact_selection: ArtifactSelection,

    /// Arguments passed to the project's build wrapper
    pub build_args: String,

    /// Version-control client used for shallow clones
    pub git_program: String,

    /// Android SDK location, overriding ANDROID_SDK_ROOT / ANDROID_HOME
    pub android_sdk_root: Option<PathBuf>,

    pub key_alias: String,

    pub key_validity_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_download_url: DEFAULT_GITHUB_DOWNLOAD_URL.to_string(),
            gitlab_api_url: DEFAULT_GITLAB_API_URL.to_string(),
            artifact_pattern: DEFAULT_ARTIFACT_PATTERN.to_string(),
            artifact_selection: ArtifactSelection::default(),
            build_args: DEFAULT_BUILD_ARGS.to_string(),
            git_program: "git".to_string(),
            android_sdk_root: None,
            key_alias: DEFAULT_KEY_ALIAS.to_string(),
            key_validity_days: DEFAULT_KEY_VALIDITY_DAYS,
        }
    }
}
