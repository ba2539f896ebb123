use async_trait::async_trait;

use super::{parse_version, Release, ReleaseHost};
use crate::process::Command;
use crate::registry::RemoteKind;
use crate::{ForgeError, Result};

/// Reads the newest version tag straight from the repository
pub struct GitTagReleases {
    git_program: String,
}

impl GitTagReleases {
    pub fn new(git_program: &str) -> Self {
        Self {
            git_program: git_program.to_string(),
        }
    }
}

#[async_trait]
impl ReleaseHost for GitTagReleases {
    async fn latest_release(&self, remote: RemoteKind, repository: &str) -> Result<Release> {
        let url = remote.repository_url(repository);
        let lookup_error = |reason: String| ForgeError::VersionLookup {
            repository: repository.to_string(),
            reason,
        };

        let result = Command::new(&self.git_program)
            .args(["ls-remote", "--tags", "--refs"])
            .arg(&url)
            .env("GIT_TERMINAL_PROMPT", "0")
            .execute_checked()
            .await
            .map_err(|e| lookup_error(e.to_string()))?;

        let listing = result.stdout.unwrap_or_default();
        let tag = latest_tag_from_ls_remote(&listing)
            .ok_or_else(|| lookup_error(format!("no version tags found at {url}")))?;

        Ok(Release { tag, branch: None })
    }
}

/// Pick the highest version tag from `git ls-remote --tags` output
///
/// Tags that do not read as a version are ignored.
pub fn latest_tag_from_ls_remote(listing: &str) -> Option<String> {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|reference| reference.strip_prefix("refs/tags/"))
        .filter_map(|tag| parse_version(tag).map(|version| (version, tag)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, tag)| tag.to_string())
}
