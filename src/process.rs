//! External tool execution
//!
//! Every external collaborator (git, the Gradle wrapper, keytool, zipalign,
//! apksigner) is spawned directly with an argv array through
//! `tokio::process::Command`. No shell is involved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// A single external command
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Program to execute (must be in PATH or absolute path)
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Environment variables (extends system environment)
    pub env_vars: HashMap<String, String>,
    /// Stream output to the terminal instead of capturing it
    pub inherit_output: bool,
}

/// Result of command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: i32,
    /// Standard output (if captured)
    pub stdout: Option<String>,
    /// Standard error (if captured)
    pub stderr: Option<String>,
    pub success: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Failed to start '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with status {exit_code}{}", stderr_suffix(stderr))]
    NonZeroExit {
        program: String,
        exit_code: i32,
        stderr: Option<String>,
    },
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!(": {text}"),
        _ => String::new(),
    }
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env_vars: HashMap::new(),
            inherit_output: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(name.into(), value.into());
        self
    }

    pub fn inherit_output(mut self) -> Self {
        self.inherit_output = true;
        self
    }

    /// Run to completion, returning the exit status and any captured output
    pub async fn execute(&self) -> Result<ExecutionResult, ExecutionError> {
        tracing::debug!(program = %self.program, args = ?self.args, cwd = ?self.working_dir, "Spawning process");

        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args).envs(&self.env_vars).stdin(Stdio::null());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let spawn_error = |source| ExecutionError::ProcessSpawn {
            program: self.program.clone(),
            source,
        };

        if self.inherit_output {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await
                .map_err(spawn_error)?;

            return Ok(ExecutionResult {
                exit_code: status.code().unwrap_or(-1),
                stdout: None,
                stderr: None,
                success: status.success(),
            });
        }

        let output = cmd.output().await.map_err(spawn_error)?;
        Ok(ExecutionResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            success: output.status.success(),
        })
    }

    /// Run and treat a non-zero exit as an error
    pub async fn execute_checked(&self) -> Result<ExecutionResult, ExecutionError> {
        let result = self.execute().await?;
        if !result.success {
            return Err(ExecutionError::NonZeroExit {
                program: self.program.clone(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }
}
