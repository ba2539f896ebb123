//! Registry store (apps.json)
//!
//! The registry is the single source of truth for which apps can be built.
//! Every mutation is a whole-document read-modify-write; there is no locking,
//! so two processes editing the same file concurrently will lose updates.

use serde_json::Value;
use std::path::{Path, PathBuf};

use super::AppDescriptor;
use crate::{ForgeError, Result};

/// Handle to the persisted registry document
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every descriptor, in document order
    ///
    /// A missing or empty file is an empty registry.
    pub fn load(&self) -> Result<Vec<AppDescriptor>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: Value =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        // A lone record is accepted as a one-entry registry
        let records = match document {
            Value::Array(records) => records,
            record @ Value::Object(_) => vec![record],
            _ => return Err(self.corrupt("expected an array of app records".to_string())),
        };

        records
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(|e| self.corrupt(e.to_string())))
            .collect()
    }

    /// Replace the persisted document with `apps`
    pub fn save(&self, apps: &[AppDescriptor]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(apps)?;
        std::fs::write(&self.path, content)?;

        tracing::debug!("Wrote {} app(s) to {}", apps.len(), self.path.display());
        Ok(())
    }

    /// Find an app by name (case-insensitive)
    pub fn lookup(&self, name: &str) -> Result<AppDescriptor> {
        self.load()?
            .into_iter()
            .find(|app| app.matches(name))
            .ok_or_else(|| ForgeError::RegistryNotFound {
                name: name.to_lowercase(),
            })
    }

    /// Append a new app, rejecting duplicates by name
    pub fn add(&self, app: AppDescriptor) -> Result<()> {
        if app.name.is_empty() || app.name == "app" {
            return Err(ForgeError::Config(format!(
                "'{}' cannot be used as an app name",
                app.name
            )));
        }

        let mut apps = self.load()?;
        if apps.iter().any(|existing| existing.matches(&app.name)) {
            return Err(ForgeError::AlreadyRegistered { name: app.name });
        }

        tracing::info!("Registering {} ({} on {})", app.name, app.repository, app.remote);
        apps.push(app);
        self.save(&apps)
    }

    /// Remove an app by name (case-insensitive)
    pub fn remove(&self, name: &str) -> Result<AppDescriptor> {
        let mut apps = self.load()?;
        let index = apps
            .iter()
            .position(|app| app.matches(name))
            .ok_or_else(|| ForgeError::RegistryNotFound {
                name: name.to_lowercase(),
            })?;

        let removed = apps.remove(index);
        self.save(&apps)?;

        tracing::info!("Removed {} from the registry", removed.name);
        Ok(removed)
    }

    pub fn list(&self) -> Result<Vec<AppDescriptor>> {
        self.load()
    }

    fn corrupt(&self, reason: String) -> ForgeError {
        ForgeError::RegistryCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RemoteKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn registry_in(temp: &TempDir) -> Registry {
        Registry::new(temp.path().join("apps.json"))
    }

    fn foo() -> AppDescriptor {
        AppDescriptor::new("foo", "acme/foo", "master", RemoteKind::Github)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(registry_in(&temp).list().unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        std::fs::write(registry.path(), "").unwrap();
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_add_then_lookup() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);

        registry.add(foo()).unwrap();

        assert_eq!(registry.lookup("foo").unwrap(), foo());
        assert_eq!(registry.lookup("FOO").unwrap(), foo());
    }

    #[test]
    fn test_duplicate_add_rejected_and_unchanged() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        registry.add(foo()).unwrap();
        let before = std::fs::read_to_string(registry.path()).unwrap();

        let other = AppDescriptor::new("Foo", "someone/foo", "dev", RemoteKind::Gitlab);
        let result = registry.add(other);

        assert!(matches!(result, Err(ForgeError::AlreadyRegistered { name }) if name == "foo"));
        assert_eq!(std::fs::read_to_string(registry.path()).unwrap(), before);
        assert_eq!(registry.lookup("foo").unwrap(), foo());
    }

    #[test]
    fn test_remove_then_lookup_fails() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        registry.add(foo()).unwrap();

        let removed = registry.remove("FOO").unwrap();
        assert_eq!(removed, foo());

        assert!(matches!(
            registry.lookup("foo"),
            Err(ForgeError::RegistryNotFound { .. })
        ));
    }

    #[test]
    fn test_non_ascii_names_are_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        registry
            .add(AppDescriptor::new("Ünicode", "acme/unicode", "master", RemoteKind::Github))
            .unwrap();

        assert_eq!(registry.lookup("ÜNICODE").unwrap().name, "ünicode");
        assert_eq!(registry.remove("Ünicode").unwrap().name, "ünicode");
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = registry_in(&temp).remove("ghost");
        assert!(matches!(result, Err(ForgeError::RegistryNotFound { name }) if name == "ghost"));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        for name in ["zeta", "alpha", "mid"] {
            registry
                .add(AppDescriptor::new(name, format!("acme/{name}"), "master", RemoteKind::Github))
                .unwrap();
        }

        let names: Vec<_> = registry.list().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_single_record_document() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        std::fs::write(
            registry.path(),
            r#"{"app":"foo","foo":[{"repository":"acme/foo","branch":"master","remote":"github"}]}"#,
        )
        .unwrap();

        assert_eq!(registry.list().unwrap(), vec![foo()]);
    }

    #[test]
    fn test_corrupt_document() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp);
        std::fs::write(registry.path(), "{not json").unwrap();

        let err = registry.list().unwrap_err();
        assert!(err.is_batch_fatal());
    }

    #[test]
    fn test_reserved_name_rejected() {
        let temp = TempDir::new().unwrap();
        let app = AppDescriptor::new("app", "acme/app", "master", RemoteKind::Github);
        assert!(matches!(registry_in(&temp).add(app), Err(ForgeError::Config(_))));
    }
}
