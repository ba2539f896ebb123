//! App descriptors and their on-disk record shape
//!
//! Each record in `apps.json` is keyed by the app name:
//!
//! ```json
//! {"app": "foo", "foo": [{"repository": "acme/foo", "branch": "master", "remote": "github"}]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Key holding the app name inside a record
const NAME_KEY: &str = "app";

/// Upstream host type, selects the acquisition strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    Github,
    Gitlab,
    Bitbucket,
    Other,
}

impl RemoteKind {
    /// Match a host name against the known hosts
    pub fn from_host(host: &str) -> Self {
        let host = host.trim_start_matches("www.").to_ascii_lowercase();
        match host.as_str() {
            "github.com" => RemoteKind::Github,
            "gitlab.com" => RemoteKind::Gitlab,
            "bitbucket.org" => RemoteKind::Bitbucket,
            _ => RemoteKind::Other,
        }
    }

    /// Host name for the known kinds
    pub fn host(&self) -> Option<&'static str> {
        match self {
            RemoteKind::Github => Some("github.com"),
            RemoteKind::Gitlab => Some("gitlab.com"),
            RemoteKind::Bitbucket => Some("bitbucket.org"),
            RemoteKind::Other => None,
        }
    }

    /// HTTPS clone URL for a repository on this kind of host
    ///
    /// Repositories on `Other` hosts keep their host as the first path segment.
    pub fn repository_url(&self, repository: &str) -> String {
        match self.host() {
            Some(host) => format!("https://{host}/{repository}.git"),
            None => format!("https://{repository}.git"),
        }
    }
}

impl fmt::Display for RemoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteKind::Github => write!(f, "github"),
            RemoteKind::Gitlab => write!(f, "gitlab"),
            RemoteKind::Bitbucket => write!(f, "bitbucket"),
            RemoteKind::Other => write!(f, "other"),
        }
    }
}

/// The registry's record for one application's source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AppDescriptor {
    /// Lowercase unique identifier
    pub name: String,
    /// Host-relative repository path (`owner/project`)
    pub repository: String,
    /// Branch used for clone-based acquisition
    pub branch: String,
    pub remote: RemoteKind,
}

/// Source location as stored under the app-name key
#[derive(Debug, Deserialize)]
struct SourceEntry {
    repository: String,
    branch: String,
    remote: RemoteKind,
}

impl AppDescriptor {
    pub fn new(
        name: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
        remote: RemoteKind,
    ) -> Self {
        Self {
            name: name.into().to_lowercase(),
            repository: repository.into(),
            branch: branch.into(),
            remote,
        }
    }

    /// Names are unique case-insensitively
    pub fn matches(&self, name: &str) -> bool {
        self.name == name.to_lowercase()
    }
}

impl From<AppDescriptor> for Map<String, Value> {
    fn from(app: AppDescriptor) -> Self {
        let entry = serde_json::json!({
            "repository": app.repository,
            "branch": app.branch,
            "remote": app.remote.to_string(),
        });
        let mut record = Map::new();
        record.insert(NAME_KEY.to_string(), Value::String(app.name.clone()));
        record.insert(app.name, Value::Array(vec![entry]));
        record
    }
}

impl TryFrom<Map<String, Value>> for AppDescriptor {
    type Error = String;

    fn try_from(mut record: Map<String, Value>) -> Result<Self, Self::Error> {
        let name = match record.remove(NAME_KEY) {
            Some(Value::String(name)) => name,
            _ => return Err(format!("record is missing a string \"{NAME_KEY}\" field")),
        };

        let entry = record
            .remove(&name)
            .and_then(|v| match v {
                Value::Array(mut entries) if !entries.is_empty() => Some(entries.swap_remove(0)),
                _ => None,
            })
            .ok_or_else(|| format!("record '{name}' has no source entry"))?;

        let entry: SourceEntry = serde_json::from_value(entry)
            .map_err(|e| format!("record '{name}' has an invalid source entry: {e}"))?;

        Ok(AppDescriptor::new(
            name,
            entry.repository,
            entry.branch,
            entry.remote,
        ))
    }
}
