use async_trait::async_trait;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use super::{CommandContext, CommandHandler, CommandResult};
use crate::registry::AppDescriptor;
use crate::Result;

/// Handler for the `list` command
pub struct ListCommand;

#[async_trait]
impl CommandHandler for ListCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let apps = ctx.registry().list()?;
        if apps.is_empty() {
            return Ok(CommandResult::Success(Some(
                "No apps registered. Add one with: apkforge add <repository-url>".to_string(),
            )));
        }

        Ok(CommandResult::Success(Some(render_table(&apps))))
    }

    fn name(&self) -> &'static str {
        "list"
    }
}

/// Table row for a registered app
#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Remote")]
    remote: String,
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Branch")]
    branch: String,
}

/// Registry contents as a table, in registry order
pub fn render_table(apps: &[AppDescriptor]) -> String {
    let rows: Vec<AppRow> = apps
        .iter()
        .map(|app| AppRow {
            name: app.name.clone(),
            remote: app.remote.to_string(),
            repository: app.repository.clone(),
            branch: app.branch.clone(),
        })
        .collect();

    Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}
