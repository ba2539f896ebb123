use async_trait::async_trait;

use super::{CommandContext, CommandHandler, CommandResult};
use crate::pipeline::{BatchReport, BuildOutcome, Pipeline};
use crate::Result;

/// Handler for the `build` command
pub struct BuildCommand {
    pub name: String,
    pub sign: bool,
}

#[async_trait]
impl CommandHandler for BuildCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let pipeline = Pipeline::from_settings(ctx.paths.clone(), &ctx.settings, self.sign)?;
        let outcome = pipeline.build_app(&self.name).await?;
        Ok(CommandResult::Success(Some(describe(&self.name, &outcome))))
    }

    fn name(&self) -> &'static str {
        "build"
    }
}

impl BuildCommand {
    pub fn new(name: String, sign: bool) -> Self {
        Self { name, sign }
    }
}

/// Handler for the `build-all` command
pub struct BuildAllCommand {
    pub sign: bool,
}

#[async_trait]
impl CommandHandler for BuildAllCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let pipeline = Pipeline::from_settings(ctx.paths.clone(), &ctx.settings, self.sign)?;
        let report = pipeline.build_all().await?;

        print!("{}", summarize(&report));

        let failures = report.failures();
        Ok(if failures == 0 {
            CommandResult::Success(None)
        } else {
            CommandResult::Error(format!(
                "{} of {} app(s) failed to build",
                failures,
                report.entries.len()
            ))
        })
    }

    fn name(&self) -> &'static str {
        "build-all"
    }
}

impl BuildAllCommand {
    pub fn new(sign: bool) -> Self {
        Self { sign }
    }
}

fn describe(name: &str, outcome: &BuildOutcome) -> String {
    match outcome {
        BuildOutcome::AlreadyBuilt { tag, artifact } => match artifact {
            Some(path) => format!("{name} {tag} is already built: {}", path.display()),
            None => format!("{name} {tag} is already built"),
        },
        BuildOutcome::Built { tag, artifact, .. } => {
            format!("{name} {tag} built: {}", artifact.display())
        }
    }
}

/// One line per app, then the totals
fn summarize(report: &BatchReport) -> String {
    let mut summary = String::new();
    for (name, result) in &report.entries {
        let line = match result {
            Ok(outcome) => describe(name, outcome),
            Err(e) => format!("{name} failed: {}", e.to_string().lines().next().unwrap_or("")),
        };
        summary.push_str(&line);
        summary.push('\n');
    }
    summary.push_str(&format!(
        "{} built or up to date, {} failed\n",
        report.succeeded(),
        report.failures()
    ));
    summary
}
