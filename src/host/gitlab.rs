use async_trait::async_trait;
use serde::Deserialize;

use super::{Release, ReleaseHost, USER_AGENT};
use crate::registry::RemoteKind;
use crate::{ForgeError, Result};

#[derive(Debug, Deserialize)]
struct GitLabRelease {
    tag_name: String,
}

/// GitLab REST API client for release metadata
pub struct GitLabReleases {
    client: reqwest::Client,
    api_url: String,
}

impl GitLabReleases {
    pub fn new(api_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReleaseHost for GitLabReleases {
    async fn latest_release(&self, _remote: RemoteKind, repository: &str) -> Result<Release> {
        // Project paths are addressed as a single URL-encoded id
        let url = format!(
            "{}/projects/{}/releases/permalink/latest",
            self.api_url,
            repository.replace('/', "%2F")
        );
        tracing::debug!("Querying {}", url);

        let lookup_error = |reason: String| ForgeError::VersionLookup {
            repository: repository.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| lookup_error(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(lookup_error("no published releases".to_string()));
        }
        if !status.is_success() {
            return Err(lookup_error(format!("HTTP {status} from {url}")));
        }

        let release: GitLabRelease = response
            .json()
            .await
            .map_err(|e| lookup_error(format!("invalid release metadata: {e}")))?;

        Ok(Release {
            tag: release.tag_name,
            branch: None,
        })
    }
}
