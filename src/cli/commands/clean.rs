use async_trait::async_trait;

use super::{CommandContext, CommandHandler, CommandResult};
use crate::Result;

/// Handler for the `clean` command
///
/// Removing the output root also drops every app's "already built" marker,
/// so the next build rebuilds everything.
pub struct CleanCommand;

#[async_trait]
impl CommandHandler for CleanCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        ctx.paths.clean_out_dir()?;
        Ok(CommandResult::Success(Some(format!(
            "Removed published artifacts under {}",
            ctx.paths.out_dir.display()
        ))))
    }

    fn name(&self) -> &'static str {
        "clean"
    }
}
