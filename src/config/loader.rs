use super::types::Settings;
use crate::{ForgeError, Result};
use std::path::Path;

impl Settings {
    /// Load settings from a YAML file, falling back to defaults when it is absent
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        // An empty file is valid and means "all defaults"
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml_ng::from_str(&contents).map_err(|e| {
            ForgeError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Split `build_args` into argv entries
    pub fn build_argv(&self) -> Result<Vec<String>> {
        shell_words::split(&self.build_args)
            .map_err(|e| ForgeError::Config(format!("Invalid build_args '{}': {}", self.build_args, e)))
    }

    fn validate(&self) -> Result<()> {
        glob::Pattern::new(&self.artifact_pattern).map_err(|e| {
            ForgeError::Config(format!(
                "Invalid artifact_pattern '{}': {}",
                self.artifact_pattern, e
            ))
        })?;

        if self.build_argv()?.is_empty() {
            return Err(ForgeError::Config("build_args must not be empty".to_string()));
        }

        if self.key_alias.trim().is_empty() {
            return Err(ForgeError::Config("key_alias must not be empty".to_string()));
        }

        Ok(())
    }
}
