use async_trait::async_trait;

use super::{CommandContext, CommandHandler, CommandResult};
use crate::Result;

/// Handler for the `remove` command
pub struct RemoveCommand {
    pub name: String,
}

#[async_trait]
impl CommandHandler for RemoveCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let removed = ctx.registry().remove(&self.name)?;
        Ok(CommandResult::Success(Some(format!(
            "Removed {} ({})",
            removed.name, removed.repository
        ))))
    }

    fn name(&self) -> &'static str {
        "remove"
    }
}

impl RemoveCommand {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}
