use std::path::{Path, PathBuf};

use crate::host::{path_version, tag_component};
use crate::process::Command;
use crate::registry::AppDescriptor;
use crate::{ForgeError, Result};

/// Single-branch, depth-1 clone through the git client
pub struct ShallowClone {
    git_program: String,
}

impl ShallowClone {
    pub fn new(git_program: &str) -> Self {
        Self {
            git_program: git_program.to_string(),
        }
    }

    /// Versioned clone destination inside the workspace
    pub fn clone_dir(app: &AppDescriptor, tag: &str, workspace: &Path) -> PathBuf {
        workspace.join(format!("{}-{}", app.name, tag_component(path_version(tag))))
    }

    pub fn clone_command(&self, app: &AppDescriptor, tag: &str, workspace: &Path) -> Command {
        let dest = Self::clone_dir(app, tag, workspace);
        Command::new(&self.git_program)
            .args(["clone", "--single-branch", "--depth", "1", "--branch"])
            .arg(&app.branch)
            .arg(app.remote.repository_url(&app.repository))
            .arg(dest.to_string_lossy())
            .env("GIT_TERMINAL_PROMPT", "0")
    }

    pub async fn fetch(&self, app: &AppDescriptor, tag: &str, workspace: &Path) -> Result<()> {
        self.clone_command(app, tag, workspace)
            .execute_checked()
            .await
            .map_err(|e| ForgeError::Acquisition {
                name: app.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
