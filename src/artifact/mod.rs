//! Artifact discovery and publication
//!
//! Outputs live under `out/<name>-<tag>/`. A non-empty output directory for
//! a `(name, tag)` pair means that version was already published and the
//! whole acquire/build cycle can be skipped.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{ArtifactSelection, Settings};
use crate::host::tag_component;
use crate::{ForgeError, Result};

/// Extension of published artifacts
pub const ARTIFACT_EXTENSION: &str = "apk";

/// Deterministic naming of published outputs
#[derive(Debug, Clone)]
pub struct OutputLayout {
    out_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn output_dir(&self, name: &str, tag: &str) -> PathBuf {
        self.out_dir.join(format!("{name}-{}", tag_component(tag)))
    }

    pub fn unsigned_path(&self, name: &str, tag: &str) -> PathBuf {
        self.artifact_path(name, tag, "unsigned")
    }

    pub fn signed_path(&self, name: &str, tag: &str) -> PathBuf {
        self.artifact_path(name, tag, "signed")
    }

    fn artifact_path(&self, name: &str, tag: &str, flavor: &str) -> PathBuf {
        self.output_dir(name, tag).join(format!(
            "{name}-{}-{flavor}.{ARTIFACT_EXTENSION}",
            tag_component(tag)
        ))
    }

    /// The idempotence marker: an existing, non-empty output directory
    pub fn is_published(&self, name: &str, tag: &str) -> bool {
        std::fs::read_dir(self.output_dir(name, tag))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    /// The artifact a previous run left behind, preferring the signed one
    pub fn published_artifact(&self, name: &str, tag: &str) -> Option<PathBuf> {
        [self.signed_path(name, tag), self.unsigned_path(name, tag)]
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Copy a freshly built artifact to its versioned unsigned location
    pub fn publish(&self, name: &str, tag: &str, artifact: &Path) -> Result<PathBuf> {
        let dir = self.output_dir(name, tag);
        std::fs::create_dir_all(&dir)?;

        let dest = self.unsigned_path(name, tag);
        std::fs::copy(artifact, &dest)?;

        tracing::info!("Published {} to {}", artifact.display(), dest.display());
        Ok(dest)
    }
}

/// Searches a build tree for the release artifact
#[derive(Debug, Clone)]
pub struct ArtifactFinder {
    pattern: glob::Pattern,
    selection: ArtifactSelection,
}

impl ArtifactFinder {
    pub fn new(pattern: &str, selection: ArtifactSelection) -> Result<Self> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| {
            ForgeError::Config(format!("Invalid artifact pattern '{pattern}': {e}"))
        })?;
        Ok(Self { pattern, selection })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.artifact_pattern, settings.artifact_selection)
    }

    /// Every file under `root` whose name matches, in sorted traversal order
    pub fn candidates(&self, root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|name| self.pattern.matches(name))
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect()
    }

    /// Select the single artifact produced by a build
    pub fn find(&self, root: &Path) -> Result<PathBuf> {
        let mut candidates = self.candidates(root);
        tracing::debug!("Artifact candidates under {}: {:?}", root.display(), candidates);

        match (candidates.len(), self.selection) {
            (0, _) => Err(ForgeError::ArtifactNotFound {
                pattern: self.pattern.as_str().to_string(),
                root: root.to_path_buf(),
            }),
            (1, _) | (_, ArtifactSelection::First) => {
                if candidates.len() > 1 {
                    tracing::warn!(
                        "{} artifacts match '{}', using {}",
                        candidates.len(),
                        self.pattern.as_str(),
                        candidates[0].display()
                    );
                }
                Ok(candidates.remove(0))
            }
            (_, ArtifactSelection::Strict) => Err(ForgeError::AmbiguousArtifact {
                pattern: self.pattern.as_str().to_string(),
                candidates,
            }),
        }
    }
}
