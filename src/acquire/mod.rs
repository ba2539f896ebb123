//! Source acquisition
//!
//! Materializes a versioned snapshot of an app's source tree inside its
//! scratch sub-workspace. GitHub releases are fetched as source archives;
//! every other host is shallow-cloned.
//!
//! Whatever strategy runs, the postcondition is the same: the sub-workspace
//! holds exactly one top-level directory, found by listing rather than by
//! guessing the name the archive or clone produced.

mod archive;
mod clone;

pub use archive::ArchiveDownload;
pub use clone::ShallowClone;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::registry::{AppDescriptor, RemoteKind};
use crate::{ForgeError, Result};

/// Fetches an app's source at a given tag
#[async_trait]
pub trait SourceAcquirer: Send + Sync {
    /// Populate `workspace` and return the acquired source tree
    async fn acquire(&self, app: &AppDescriptor, tag: &str, workspace: &Path) -> Result<PathBuf>;
}

/// Picks archive download or shallow clone by remote kind
pub struct UpstreamSource {
    archive: ArchiveDownload,
    clone: ShallowClone,
}

impl UpstreamSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            archive: ArchiveDownload::new(&settings.github_download_url)?,
            clone: ShallowClone::new(&settings.git_program),
        })
    }
}

#[async_trait]
impl SourceAcquirer for UpstreamSource {
    async fn acquire(&self, app: &AppDescriptor, tag: &str, workspace: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(workspace)?;

        let fetched = match app.remote {
            RemoteKind::Github => {
                tracing::info!("Downloading {} {} source archive", app.name, tag);
                self.archive.fetch(app, tag, workspace).await
            }
            _ => {
                tracing::info!("Cloning {} ({} branch)", app.name, app.branch);
                self.clone.fetch(app, tag, workspace).await
            }
        };

        match fetched.and_then(|_| locate_tree(&app.name, workspace)) {
            Ok(tree) => Ok(tree),
            Err(e) => {
                // Leave nothing half-written behind for this app
                if let Err(cleanup) = std::fs::remove_dir_all(workspace) {
                    tracing::debug!("Could not clear {}: {}", workspace.display(), cleanup);
                }
                Err(e)
            }
        }
    }
}

/// Find the single top-level directory inside a workspace
pub fn locate_tree(name: &str, workspace: &Path) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(workspace)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    match dirs.len() {
        1 => Ok(dirs.remove(0)),
        0 => Err(ForgeError::Acquisition {
            name: name.to_string(),
            reason: format!("no source directory in {}", workspace.display()),
        }),
        n => Err(ForgeError::Acquisition {
            name: name.to_string(),
            reason: format!(
                "expected one source directory in {}, found {}",
                workspace.display(),
                n
            ),
        }),
    }
}
