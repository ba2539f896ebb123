//! Installation settings (apkforge.yaml)

mod loader;
mod types;

pub use types::{
    ArtifactSelection, Settings, DEFAULT_ARTIFACT_PATTERN, DEFAULT_GITHUB_API_URL,
    DEFAULT_GITHUB_DOWNLOAD_URL, DEFAULT_GITLAB_API_URL,
};
