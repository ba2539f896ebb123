use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ForgeError, Result};

/// The persisted signing identity
///
/// The passphrase is stored in plaintext next to the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreRecord {
    pub key_location: PathBuf,
    pub alias: String,
    pub passphrase: String,
    /// When the keystore was generated (RFC 3339)
    #[serde(default)]
    pub created: Option<String>,
}

impl KeystoreRecord {
    /// Load the record, `None` when it has not been created yet
    pub fn load_from_path(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let record = serde_json::from_str(&content).map_err(|e| {
            ForgeError::Signing(format!(
                "Keystore record {} is unreadable: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Some(record))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}
