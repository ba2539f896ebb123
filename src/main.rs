//! apkforge - builds Android apps from their latest upstream source releases

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apkforge::cli::commands::{handler_for, CommandContext, CommandResult};
use apkforge::cli::{Cli, LogLevel};
use apkforge::io::ForgePaths;

fn initialize_tracing(log_level: Option<LogLevel>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level.to_filter_directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    let paths = match &cli.root {
        Some(root) => ForgePaths::for_root(root),
        None => ForgePaths::new()?,
    };
    let ctx = CommandContext::load(paths).context("Failed to load apkforge.yaml")?;

    let handler = handler_for(cli.command);
    tracing::debug!("Running {} in {}", handler.name(), ctx.paths.root.display());

    let result = handler
        .execute(&ctx)
        .await
        .with_context(|| format!("apkforge {} failed", handler.name()))?;

    if let Some(message) = result.message() {
        match &result {
            CommandResult::Success(_) => println!("{message}"),
            _ => eprintln!("{message}"),
        }
    }

    if result.exit_code() != 0 {
        std::process::exit(result.exit_code());
    }
    Ok(())
}
