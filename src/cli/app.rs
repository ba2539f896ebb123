use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// apkforge: build Android apps from their upstream source releases
#[derive(Parser)]
#[command(name = "apkforge")]
#[command(version)]
#[command(about = "Build and sign Android apps from their latest upstream releases")]
#[command(
    long_about = "apkforge keeps a registry of Android app repositories, fetches the source of each app's latest release, builds it with the project's own Gradle wrapper and signs the result with a locally managed key."
)]
pub struct Cli {
    /// Installation root holding the registry, working/, out/ and bin/
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Log verbosity (RUST_LOG is used when omitted)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register an app from its repository URL
    Add {
        /// Repository reference, e.g. https://github.com/owner/project
        #[arg(required_unless_present = "from_file", conflicts_with = "from_file")]
        reference: Option<String>,

        /// Branch to build from, skipping branch detection
        #[arg(short, long)]
        branch: Option<String>,

        /// Register every reference listed in a file, one per line
        #[arg(long, value_name = "FILE", conflicts_with = "branch")]
        from_file: Option<PathBuf>,
    },

    /// Unregister an app
    Remove {
        /// App name (case-insensitive)
        name: String,
    },

    /// Show the registered apps
    List,

    /// Build the latest release of one app
    Build {
        /// App name (case-insensitive)
        name: String,

        /// Publish the unsigned artifact only
        #[arg(long)]
        no_sign: bool,
    },

    /// Build the latest release of every registered app
    BuildAll {
        /// Publish unsigned artifacts only
        #[arg(long)]
        no_sign: bool,
    },

    /// Delete every published artifact
    Clean,
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::Remove { .. } => "remove",
            Commands::List => "list",
            Commands::Build { .. } => "build",
            Commands::BuildAll { .. } => "build-all",
            Commands::Clean => "clean",
        }
    }
}
