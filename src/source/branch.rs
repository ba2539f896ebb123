use std::io::{BufRead, Write};

use super::SourceRef;
use crate::Result;

/// Branch used when nothing better is known
pub const DEFAULT_BRANCH: &str = "master";

/// Supplies the clone branch for references whose host cannot report one
pub trait BranchResolver: Send + Sync {
    fn resolve_branch(&self, source: &SourceRef) -> Result<String>;
}

/// Always answers with the default branch (batch mode)
pub struct DefaultBranch;

impl BranchResolver for DefaultBranch {
    fn resolve_branch(&self, _source: &SourceRef) -> Result<String> {
        Ok(DEFAULT_BRANCH.to_string())
    }
}

/// Asks the operator on the terminal, empty input means the default branch
pub struct PromptBranch;

impl BranchResolver for PromptBranch {
    fn resolve_branch(&self, source: &SourceRef) -> Result<String> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        prompt_branch(&mut stdin.lock(), &mut stdout, source)
    }
}

fn prompt_branch<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    source: &SourceRef,
) -> Result<String> {
    write!(
        output,
        "Branch to build {} from [{}]: ",
        source.name, DEFAULT_BRANCH
    )?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let branch = line.trim();
    if branch.is_empty() {
        Ok(DEFAULT_BRANCH.to_string())
    } else {
        Ok(branch.to_string())
    }
}
