use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("App '{name}' is not registered.\n\nTo register it, run:\n  apkforge add <repository-url>")]
    RegistryNotFound { name: String },

    #[error("App '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Cannot read '{reference}' as a repository reference: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("Registry file {path} is corrupted: {reason}")]
    RegistryCorrupt { path: PathBuf, reason: String },

    #[error("Failed to look up the latest release of {repository}: {reason}")]
    VersionLookup { repository: String, reason: String },

    #[error("Failed to acquire source for {name}: {reason}")]
    Acquisition { name: String, reason: String },

    #[error("Build of {name} failed: {reason}\n\nSource tree kept at {tree} for a manual retry")]
    BuildFailure {
        name: String,
        tree: PathBuf,
        reason: String,
    },

    #[error("No file matching '{pattern}' found under {root}")]
    ArtifactNotFound { pattern: String, root: PathBuf },

    #[error("Found {} artifacts matching '{pattern}', expected exactly one:\n{}", candidates.len(), format_candidates(candidates))]
    AmbiguousArtifact {
        pattern: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    Path(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ForgeError {
    /// Errors that must stop a batch run instead of being skipped per app
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, ForgeError::RegistryCorrupt { .. })
    }
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, ForgeError>;
