use async_trait::async_trait;
use serde::Deserialize;

use super::{Release, ReleaseHost, USER_AGENT};
use crate::registry::RemoteKind;
use crate::{ForgeError, Result};

/// Subset of the GitHub release object we use
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    target_commitish: Option<String>,
}

/// GitHub REST API client for release metadata
pub struct GitHubReleases {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubReleases {
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn lookup_error(repository: &str, reason: impl Into<String>) -> ForgeError {
        ForgeError::VersionLookup {
            repository: repository.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ReleaseHost for GitHubReleases {
    async fn latest_release(&self, _remote: RemoteKind, repository: &str) -> Result<Release> {
        let url = format!("{}/repos/{}/releases/latest", self.api_url, repository);
        tracing::debug!("Querying {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::lookup_error(repository, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Self::lookup_error(repository, "no published releases"));
        }
        if !status.is_success() {
            return Err(Self::lookup_error(repository, format!("HTTP {status} from {url}")));
        }

        let release: GitHubRelease = response
            .json()
            .await
            .map_err(|e| Self::lookup_error(repository, format!("invalid release metadata: {e}")))?;

        Ok(Release {
            tag: release.tag_name,
            branch: release.target_commitish.filter(|b| !b.is_empty()),
        })
    }
}
