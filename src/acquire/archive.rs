use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::host::USER_AGENT;
use crate::registry::AppDescriptor;
use crate::{ForgeError, Result};

/// Downloads and unpacks a release source archive
pub struct ArchiveDownload {
    client: reqwest::Client,
    download_url: String,
}

impl ArchiveDownload {
    pub fn new(download_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            download_url: download_url.trim_end_matches('/').to_string(),
        })
    }

    /// Archive URL for a repository at a tag (the tag is used verbatim)
    pub fn archive_url(&self, repository: &str, tag: &str) -> String {
        format!("{}/{}/archive/{}.tar.gz", self.download_url, repository, tag)
    }

    /// Stream the archive into `workspace`, unpack it there, then delete it
    pub async fn fetch(&self, app: &AppDescriptor, tag: &str, workspace: &Path) -> Result<()> {
        let acquisition_error = |reason: String| ForgeError::Acquisition {
            name: app.name.clone(),
            reason,
        };

        let url = self.archive_url(&app.repository, tag);
        let archive_path = workspace.join(format!("{}.tar.gz", app.name));

        self.download(&url, &archive_path)
            .await
            .map_err(|e| acquisition_error(format!("download of {url} failed: {e}")))?;

        unpack(&archive_path, workspace)
            .and_then(|_| std::fs::remove_file(&archive_path))
            .map_err(|e| acquisition_error(format!("could not extract {url}: {e}")))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!("Downloading {} to {}", url, dest.display());

        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!("Downloaded {} bytes", written);
        Ok(())
    }
}

/// Extract a gzipped tarball into a directory
fn unpack(archive_path: &Path, dest: &Path) -> std::io::Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let gz_decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(gz_decoder);
    archive.set_preserve_permissions(true);
    archive.unpack(dest)
}
