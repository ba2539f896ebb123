//! Build invocation
//!
//! The project's own build tool is opaque to us: we run its wrapper script
//! and read success from the exit status. There is no retry.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::process::Command;
use crate::{ForgeError, Result};

/// Runs a project's build inside its source tree
#[async_trait]
pub trait BuildTool: Send + Sync {
    async fn invoke(&self, name: &str, tree: &Path) -> Result<()>;
}

/// The Gradle wrapper shipped with the project (`gradlew` / `gradlew.bat`)
pub struct GradleWrapper {
    args: Vec<String>,
}

impl GradleWrapper {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.build_argv()?))
    }

    /// Platform-appropriate wrapper script inside a tree
    pub fn wrapper_path(tree: &Path) -> PathBuf {
        if cfg!(windows) {
            tree.join("gradlew.bat")
        } else {
            tree.join("gradlew")
        }
    }
}

#[async_trait]
impl BuildTool for GradleWrapper {
    async fn invoke(&self, name: &str, tree: &Path) -> Result<()> {
        let failure = |reason: String| ForgeError::BuildFailure {
            name: name.to_string(),
            tree: tree.to_path_buf(),
            reason,
        };

        let wrapper = Self::wrapper_path(tree);
        if !wrapper.is_file() {
            return Err(failure(format!(
                "{} not found",
                wrapper.file_name().and_then(|n| n.to_str()).unwrap_or("gradlew")
            )));
        }
        make_executable(&wrapper)?;

        tracing::info!("Building {} with {} {}", name, wrapper.display(), self.args.join(" "));

        let result = Command::new(wrapper.to_string_lossy())
            .args(self.args.iter().cloned())
            .current_dir(tree)
            .inherit_output()
            .execute()
            .await
            .map_err(|e| failure(e.to_string()))?;

        if !result.success {
            return Err(failure(format!("build tool exited with status {}", result.exit_code)));
        }

        tracing::info!("Build of {} succeeded", name);
        Ok(())
    }
}

/// Archives and clones do not always keep the wrapper's mode bits
#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    if permissions.mode() & 0o111 != 0o111 {
        permissions.set_mode(permissions.mode() | 0o755);
        std::fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
