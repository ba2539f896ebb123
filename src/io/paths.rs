use crate::{ForgeError, Result};
use std::path::{Path, PathBuf};

/// Registry document file name
pub const REGISTRY_FILE: &str = "apps.json";

/// Settings file name
pub const SETTINGS_FILE: &str = "apkforge.yaml";

/// Keystore record file name (inside the bin directory)
pub const KEYSTORE_RECORD_FILE: &str = "keystore.json";

/// Path management for an apkforge installation
#[derive(Debug, Clone)]
pub struct ForgePaths {
    /// Installation root (defaults to the current directory)
    pub root: PathBuf,
    /// Scratch workspace, recreated on every build invocation (working/)
    pub working_dir: PathBuf,
    /// Persistent output root, one subdirectory per (name, tag) (out/)
    pub out_dir: PathBuf,
    /// Keystore and keystore record (bin/)
    pub bin_dir: PathBuf,
}

impl ForgePaths {
    /// Create paths rooted at the current directory
    pub fn new() -> Result<Self> {
        let root = std::env::current_dir().map_err(|e| {
            ForgeError::Path(format!("Failed to determine current directory: {}", e))
        })?;
        Ok(Self::for_root(&root))
    }

    /// Create paths for a specific installation root
    pub fn for_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            working_dir: root.join("working"),
            out_dir: root.join("out"),
            bin_dir: root.join("bin"),
        }
    }

    pub fn registry_file(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn keystore_record_file(&self) -> PathBuf {
        self.bin_dir.join(KEYSTORE_RECORD_FILE)
    }

    /// Scratch sub-workspace for one application
    pub fn app_workspace(&self, name: &str) -> PathBuf {
        self.working_dir.join(name)
    }

    /// Ensure the persistent directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)?;
        std::fs::create_dir_all(&self.bin_dir)?;
        Ok(())
    }

    /// Delete and recreate the scratch workspace
    pub fn reset_working_dir(&self) -> Result<()> {
        if self.working_dir.exists() {
            std::fs::remove_dir_all(&self.working_dir)?;
        }
        std::fs::create_dir_all(&self.working_dir)?;
        Ok(())
    }

    /// Remove every published output
    pub fn clean_out_dir(&self) -> Result<()> {
        if self.out_dir.exists() {
            std::fs::remove_dir_all(&self.out_dir)?;
        }
        std::fs::create_dir_all(&self.out_dir)?;
        Ok(())
    }
}
