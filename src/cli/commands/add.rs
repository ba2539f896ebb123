use async_trait::async_trait;
use std::path::PathBuf;

use super::{CommandContext, CommandHandler, CommandResult};
use crate::host::UpstreamHosts;
use crate::pipeline::{register, register_from_list};
use crate::source::{DefaultBranch, PromptBranch};
use crate::{ForgeError, Result};

/// Handler for the `add` command
pub struct AddCommand {
    pub reference: Option<String>,
    pub branch: Option<String>,
    pub from_file: Option<PathBuf>,
}

#[async_trait]
impl CommandHandler for AddCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let registry = ctx.registry();
        let host = UpstreamHosts::from_settings(&ctx.settings)?;

        if let Some(file) = &self.from_file {
            let listing = std::fs::read_to_string(file).map_err(|e| {
                ForgeError::Config(format!("Cannot read {}: {}", file.display(), e))
            })?;

            // Batch registration never prompts; non-GitHub apps get the default branch
            let report = register_from_list(&registry, &listing, &host, &DefaultBranch).await?;
            for (reference, result) in &report.entries {
                match result {
                    Ok(app) => println!("Registered {} ({}, branch {})", app.name, app.repository, app.branch),
                    Err(e) => println!("Skipped {reference}: {e}"),
                }
            }

            let failures = report.failures();
            return Ok(if failures == 0 {
                CommandResult::Success(None)
            } else {
                CommandResult::Warning(format!("{failures} reference(s) were not registered"))
            });
        }

        let reference = self.reference.as_deref().ok_or_else(|| {
            ForgeError::Config("A repository reference or --from-file is required".to_string())
        })?;

        let app = register(&registry, reference, self.branch.as_deref(), &host, &PromptBranch).await?;
        Ok(CommandResult::Success(Some(format!(
            "Registered {} ({} on {}, branch {})",
            app.name, app.repository, app.remote, app.branch
        ))))
    }

    fn name(&self) -> &'static str {
        "add"
    }
}

impl AddCommand {
    pub fn new(reference: Option<String>, branch: Option<String>, from_file: Option<PathBuf>) -> Self {
        Self {
            reference,
            branch,
            from_file,
        }
    }
}
