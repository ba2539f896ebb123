use crate::registry::RemoteKind;
use crate::{ForgeError, Result};

/// A parsed repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    /// Lowercased last path segment
    pub name: String,
    /// Host-relative path for known hosts, host-prefixed path otherwise
    pub repository: String,
    pub remote: RemoteKind,
}

/// Parse a free-form repository reference
///
/// Accepts full URLs (`https://github.com/owner/project`), scheme-less
/// references (`github.com/owner/project`), scp-style git remotes
/// (`git@gitlab.com:owner/project.git`) and bare `owner/project` paths.
/// Without a scheme the first segment is taken as the host.
pub fn parse_reference(reference: &str) -> Result<SourceRef> {
    let invalid = |reason: &str| ForgeError::InvalidReference {
        reference: reference.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = reference.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let without_scheme = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => match trimmed.strip_prefix("git@") {
            Some(rest) => return parse_scp_style(rest, reference),
            None => trimmed,
        },
    };

    let segments: Vec<&str> = without_scheme.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return Err(invalid("expected at least an owner and a project"));
    }

    // Drop credentials and port from the host segment
    let host = segments[0].rsplit('@').next().unwrap_or(segments[0]);
    let host = host.split(':').next().unwrap_or(host);
    let remote = RemoteKind::from_host(host);

    let repository = match remote {
        RemoteKind::Other => {
            let mut parts = vec![host];
            parts.extend(&segments[1..]);
            parts.join("/")
        }
        _ => {
            if segments.len() < 3 {
                return Err(invalid("expected an owner and a project after the host"));
            }
            segments[1..].join("/")
        }
    };

    let name = segments[segments.len() - 1].to_lowercase();

    Ok(SourceRef {
        name,
        repository,
        remote,
    })
}

fn parse_scp_style(rest: &str, reference: &str) -> Result<SourceRef> {
    match rest.split_once(':') {
        Some((host, path)) => parse_reference(&format!("{host}/{path}")),
        None => Err(ForgeError::InvalidReference {
            reference: reference.to_string(),
            reason: "expected git@host:owner/project".to_string(),
        }),
    }
}
