use crate::host::ReleaseHost;
use crate::registry::{AppDescriptor, Registry};
use crate::source::{locate, BranchResolver};
use crate::Result;

/// Outcome of registering a list of references, one entry per reference
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub entries: Vec<(String, Result<AppDescriptor>)>,
}

impl RegistrationReport {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_err()).count()
    }
}

/// Locate a repository reference and append it to the registry
pub async fn register(
    registry: &Registry,
    reference: &str,
    explicit_branch: Option<&str>,
    host: &dyn ReleaseHost,
    branches: &dyn BranchResolver,
) -> Result<AppDescriptor> {
    let app = locate(reference, explicit_branch, host, branches).await?;
    registry.add(app.clone())?;
    Ok(app)
}

/// Register every reference in a list, one per line
///
/// Blank lines and `#` comments are skipped. A failing reference is
/// reported and the rest are still registered; only a corrupt registry
/// stops the run.
pub async fn register_from_list(
    registry: &Registry,
    listing: &str,
    host: &dyn ReleaseHost,
    branches: &dyn BranchResolver,
) -> Result<RegistrationReport> {
    let mut report = RegistrationReport::default();

    for line in listing.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match register(registry, line, None, host, branches).await {
            Err(e) if e.is_batch_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("Could not register {}: {}", line, e);
                report.entries.push((line.to_string(), Err(e)));
            }
            Ok(app) => report.entries.push((line.to_string(), Ok(app))),
        }
    }

    Ok(report)
}
