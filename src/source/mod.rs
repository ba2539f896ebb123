//! Source location: turning a repository reference into an app descriptor

mod branch;
mod reference;

pub use branch::{BranchResolver, DefaultBranch, PromptBranch, DEFAULT_BRANCH};
pub use reference::{parse_reference, SourceRef};

use crate::host::ReleaseHost;
use crate::registry::{AppDescriptor, RemoteKind};
use crate::Result;

/// Build a descriptor for a repository reference
///
/// An explicit branch always wins. Otherwise GitHub repositories use the
/// branch their latest release was cut from (falling back to the default
/// branch when the query fails), and every other host asks `branches`.
pub async fn locate(
    reference: &str,
    explicit_branch: Option<&str>,
    host: &dyn ReleaseHost,
    branches: &dyn BranchResolver,
) -> Result<AppDescriptor> {
    let source = parse_reference(reference)?;

    let branch = match explicit_branch {
        Some(branch) => branch.to_string(),
        None if source.remote == RemoteKind::Github => {
            match host.latest_release(source.remote, &source.repository).await {
                Ok(release) => release.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                Err(e) => {
                    tracing::warn!(
                        "Could not read release branch of {}, using {}: {}",
                        source.repository,
                        DEFAULT_BRANCH,
                        e
                    );
                    DEFAULT_BRANCH.to_string()
                }
            }
        }
        None => branches.resolve_branch(&source)?,
    };

    Ok(AppDescriptor::new(
        source.name,
        source.repository,
        branch,
        source.remote,
    ))
}
