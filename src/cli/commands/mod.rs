pub mod add;
pub mod build;
pub mod clean;
pub mod list;
pub mod remove;

use async_trait::async_trait;

use super::Commands;
use crate::config::Settings;
use crate::io::ForgePaths;
use crate::registry::Registry;
use crate::Result;

/// Everything a command needs from the installation
pub struct CommandContext {
    pub paths: ForgePaths,
    pub settings: Settings,
}

impl CommandContext {
    /// Load the settings file under `paths.root` (defaults when absent)
    pub fn load(paths: ForgePaths) -> Result<Self> {
        let settings = Settings::load_from_path(&paths.settings_file())?;
        Ok(Self { paths, settings })
    }

    pub fn registry(&self) -> Registry {
        Registry::new(self.paths.registry_file())
    }
}

/// Common trait for all command handlers
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Execute the command
    async fn execute(&self, ctx: &CommandContext) -> Result<CommandResult>;

    /// Get command name for logging
    fn name(&self) -> &'static str;
}

/// Command execution result
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Success with optional message
    Success(Option<String>),
    /// Error with message
    Error(String),
    /// Warning with message
    Warning(String),
}

impl CommandResult {
    /// Convert to exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandResult::Success(_) => 0,
            CommandResult::Error(_) => 1,
            CommandResult::Warning(_) => 0,
        }
    }

    /// Get message if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandResult::Success(msg) => msg.as_deref(),
            CommandResult::Error(msg) => Some(msg),
            CommandResult::Warning(msg) => Some(msg),
        }
    }
}

/// The handler for a parsed subcommand
pub fn handler_for(command: Commands) -> Box<dyn CommandHandler> {
    match command {
        Commands::Add {
            reference,
            branch,
            from_file,
        } => Box::new(add::AddCommand::new(reference, branch, from_file)),
        Commands::Remove { name } => Box::new(remove::RemoveCommand::new(name)),
        Commands::List => Box::new(list::ListCommand),
        Commands::Build { name, no_sign } => Box::new(build::BuildCommand::new(name, !no_sign)),
        Commands::BuildAll { no_sign } => Box::new(build::BuildAllCommand::new(!no_sign)),
        Commands::Clean => Box::new(clean::CleanCommand),
    }
}
