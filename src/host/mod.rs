//! Release metadata from upstream hosts
//!
//! GitHub and GitLab are queried through their REST "latest release"
//! endpoints. Other hosts have no release API we can rely on, so their
//! newest version tag is read with `git ls-remote`.

mod git_tags;
mod github;
mod gitlab;

pub use git_tags::{latest_tag_from_ls_remote, GitTagReleases};
pub use github::GitHubReleases;
pub use gitlab::GitLabReleases;

use async_trait::async_trait;

use crate::config::Settings;
use crate::registry::{AppDescriptor, RemoteKind};
use crate::Result;

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = "apkforge";

/// The latest published release of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Tag literal, used verbatim in download URLs
    pub tag: String,
    /// Branch the release was cut from, when the host reports it
    pub branch: Option<String>,
}

/// Queries an upstream host for release metadata
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    async fn latest_release(&self, remote: RemoteKind, repository: &str) -> Result<Release>;
}

/// Resolve the tag to build for an app
///
/// Lookup failures propagate; there is no default version.
pub async fn resolve_version(host: &dyn ReleaseHost, app: &AppDescriptor) -> Result<String> {
    let release = host.latest_release(app.remote, &app.repository).await?;
    tracing::info!("Latest release of {} is {}", app.name, release.tag);
    Ok(release.tag)
}

/// Strip a single leading `v` for use in filesystem paths
pub fn path_version(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// A tag made safe to use as part of a single path component
///
/// Path separators become `-`, so `app/v1.0` maps to `app-v1.0`. URLs keep
/// the tag verbatim.
pub fn tag_component(tag: &str) -> String {
    tag.replace(['/', '\\'], "-")
}

/// Read a tag or directory name as a version
///
/// A leading `v` is dropped and missing minor/patch components are padded,
/// so `v1.2` reads as `1.2.0`.
pub fn parse_version(raw: &str) -> Option<semver::Version> {
    let raw = path_version(raw);
    if let Ok(version) = semver::Version::parse(raw) {
        return Some(version);
    }

    let padded = match raw.matches('.').count() {
        0 => format!("{raw}.0.0"),
        1 => format!("{raw}.0"),
        _ => return None,
    };
    semver::Version::parse(&padded).ok()
}

/// Dispatches to the right backend for each remote kind
pub struct UpstreamHosts {
    github: GitHubReleases,
    gitlab: GitLabReleases,
    tags: GitTagReleases,
}

impl UpstreamHosts {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        Ok(Self {
            github: GitHubReleases::new(&settings.github_api_url, token)?,
            gitlab: GitLabReleases::new(&settings.gitlab_api_url)?,
            tags: GitTagReleases::new(&settings.git_program),
        })
    }
}

#[async_trait]
impl ReleaseHost for UpstreamHosts {
    async fn latest_release(&self, remote: RemoteKind, repository: &str) -> Result<Release> {
        match remote {
            RemoteKind::Github => self.github.latest_release(remote, repository).await,
            RemoteKind::Gitlab => self.gitlab.latest_release(remote, repository).await,
            RemoteKind::Bitbucket | RemoteKind::Other => {
                self.tags.latest_release(remote, repository).await
            }
        }
    }
}
