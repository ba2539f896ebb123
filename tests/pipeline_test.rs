use apkforge::acquire::SourceAcquirer;
use apkforge::artifact::ArtifactFinder;
use apkforge::build::BuildTool;
use apkforge::config::{ArtifactSelection, DEFAULT_ARTIFACT_PATTERN};
use apkforge::host::{Release, ReleaseHost};
use apkforge::io::ForgePaths;
use apkforge::pipeline::{BuildOutcome, Pipeline};
use apkforge::registry::{AppDescriptor, Registry, RemoteKind};
use apkforge::signing::{Keystore, KeystoreRecord, PassphraseSource, Signer, SigningTools};
use apkforge::{ForgeError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type CallLog = Arc<Mutex<Vec<String>>>;

fn record(log: &CallLog, entry: String) {
    log.lock().unwrap().push(entry);
}

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Serves a fixed tag per repository
struct FakeHost {
    tags: HashMap<String, String>,
    log: CallLog,
}

#[async_trait]
impl ReleaseHost for FakeHost {
    async fn latest_release(&self, _remote: RemoteKind, repository: &str) -> Result<Release> {
        record(&self.log, format!("lookup {repository}"));
        match self.tags.get(repository) {
            Some(tag) => Ok(Release {
                tag: tag.clone(),
                branch: None,
            }),
            None => Err(ForgeError::VersionLookup {
                repository: repository.to_string(),
                reason: "no published releases".to_string(),
            }),
        }
    }
}

/// Creates an empty `<name>-<tag>` tree in the workspace
struct FakeAcquirer {
    log: CallLog,
}

#[async_trait]
impl SourceAcquirer for FakeAcquirer {
    async fn acquire(&self, app: &AppDescriptor, tag: &str, workspace: &Path) -> Result<PathBuf> {
        record(&self.log, format!("acquire {} {}", app.name, tag));
        let tree = workspace.join(format!("{}-{}", app.name, tag.trim_start_matches('v')));
        std::fs::create_dir_all(&tree)?;
        Ok(tree)
    }
}

/// Drops a release artifact into the tree unless the app is listed as broken
struct FakeBuild {
    broken: Vec<&'static str>,
    log: CallLog,
}

#[async_trait]
impl BuildTool for FakeBuild {
    async fn invoke(&self, name: &str, tree: &Path) -> Result<()> {
        record(&self.log, format!("build {name}"));
        if self.broken.contains(&name) {
            return Err(ForgeError::BuildFailure {
                name: name.to_string(),
                tree: tree.to_path_buf(),
                reason: "gradlew exited with status 1".to_string(),
            });
        }

        let outputs = tree.join("app/build/outputs/apk/release");
        std::fs::create_dir_all(&outputs)?;
        std::fs::write(outputs.join("app-release-unsigned.apk"), name.as_bytes())?;
        Ok(())
    }
}

struct FakeTools {
    log: CallLog,
}

#[async_trait]
impl SigningTools for FakeTools {
    async fn generate_key(&self, record: &KeystoreRecord, _validity_days: u32) -> Result<()> {
        std::fs::write(&record.key_location, b"key")?;
        Ok(())
    }

    async fn align(&self, input: &Path, output: &Path) -> Result<()> {
        std::fs::copy(input, output)?;
        Ok(())
    }

    async fn sign(&self, _record: &KeystoreRecord, input: &Path, output: &Path) -> Result<()> {
        record(&self.log, format!("sign {}", input.display()));
        std::fs::copy(input, output)?;
        Ok(())
    }
}

struct FixedPassphrase;

impl PassphraseSource for FixedPassphrase {
    fn passphrase(&self) -> Result<String> {
        Ok("secret-pass".to_string())
    }
}

struct Harness {
    _temp: TempDir,
    paths: ForgePaths,
    log: CallLog,
}

impl Harness {
    fn new(apps: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap();
        let paths = ForgePaths::for_root(temp.path());
        let registry = Registry::new(paths.registry_file());
        for (name, _) in apps {
            registry
                .add(AppDescriptor::new(
                    *name,
                    format!("owner/{name}"),
                    "master",
                    RemoteKind::Github,
                ))
                .unwrap();
        }

        Self {
            _temp: temp,
            paths,
            log: CallLog::default(),
        }
    }

    fn pipeline(&self, tags: &[(&str, &str)], broken: Vec<&'static str>, sign: bool) -> Pipeline {
        let tags = tags
            .iter()
            .map(|(name, tag)| (format!("owner/{name}"), tag.to_string()))
            .collect();

        let pipeline = Pipeline::new(
            self.paths.clone(),
            Box::new(FakeHost {
                tags,
                log: self.log.clone(),
            }),
            Box::new(FakeAcquirer {
                log: self.log.clone(),
            }),
            Box::new(FakeBuild {
                broken,
                log: self.log.clone(),
            }),
            ArtifactFinder::new(DEFAULT_ARTIFACT_PATTERN, ArtifactSelection::Strict).unwrap(),
        );

        if !sign {
            return pipeline;
        }

        let keystore = Keystore::new(
            &self.paths.bin_dir,
            self.paths.keystore_record_file(),
            "apkforge",
            10000,
        );
        pipeline.with_signer(Signer::new(
            keystore,
            Box::new(FakeTools {
                log: self.log.clone(),
            }),
            Box::new(FixedPassphrase),
        ))
    }

    fn out(&self, relative: &str) -> PathBuf {
        self.paths.out_dir.join(relative)
    }
}

#[tokio::test]
async fn test_single_build_publishes_and_signs() {
    let harness = Harness::new(&[("foo", "v1.2.0")]);
    let pipeline = harness.pipeline(&[("foo", "v1.2.0")], vec![], true);

    let outcome = pipeline.build_app("foo").await.unwrap();

    let signed = harness.out("foo-v1.2.0/foo-v1.2.0-signed.apk");
    assert_eq!(
        outcome,
        BuildOutcome::Built {
            tag: "v1.2.0".to_string(),
            artifact: signed.clone(),
            signed: true,
        }
    );
    assert!(signed.is_file());
    assert!(!harness.out("foo-v1.2.0/foo-v1.2.0-unsigned.apk").exists());
    assert!(!harness.out("foo-v1.2.0/foo-v1.2.0-aligned.apk").exists());
}

#[tokio::test]
async fn test_unsigned_build_keeps_unsigned_artifact() {
    let harness = Harness::new(&[("foo", "v1.2.0")]);
    let pipeline = harness.pipeline(&[("foo", "v1.2.0")], vec![], false);

    let outcome = pipeline.build_app("FOO").await.unwrap();

    let unsigned = harness.out("foo-v1.2.0/foo-v1.2.0-unsigned.apk");
    assert_eq!(outcome.artifact(), Some(&unsigned));
    assert_eq!(std::fs::read(unsigned).unwrap(), b"foo");
}

#[tokio::test]
async fn test_published_version_skips_acquire_and_build() {
    let harness = Harness::new(&[("foo", "v1.2.0")]);
    harness
        .pipeline(&[("foo", "v1.2.0")], vec![], true)
        .build_app("foo")
        .await
        .unwrap();
    harness.log.lock().unwrap().clear();

    let outcome = harness
        .pipeline(&[("foo", "v1.2.0")], vec![], true)
        .build_app("foo")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BuildOutcome::AlreadyBuilt {
            tag: "v1.2.0".to_string(),
            artifact: Some(harness.out("foo-v1.2.0/foo-v1.2.0-signed.apk")),
        }
    );
    assert_eq!(calls(&harness.log), vec!["lookup owner/foo"]);
}

#[tokio::test]
async fn test_new_release_is_built_next_to_old_one() {
    let harness = Harness::new(&[("foo", "v1.2.0")]);
    harness
        .pipeline(&[("foo", "v1.2.0")], vec![], false)
        .build_app("foo")
        .await
        .unwrap();

    harness
        .pipeline(&[("foo", "v1.3.0")], vec![], false)
        .build_app("foo")
        .await
        .unwrap();

    assert!(harness.out("foo-v1.2.0/foo-v1.2.0-unsigned.apk").is_file());
    assert!(harness.out("foo-v1.3.0/foo-v1.3.0-unsigned.apk").is_file());
}

#[tokio::test]
async fn test_failed_build_is_not_signed() {
    let harness = Harness::new(&[("foo", "v1.2.0")]);
    let pipeline = harness.pipeline(&[("foo", "v1.2.0")], vec!["foo"], true);

    let result = pipeline.build_app("foo").await;

    assert!(matches!(result, Err(ForgeError::BuildFailure { .. })));
    assert!(!harness.out("foo-v1.2.0").exists());
    assert!(!calls(&harness.log).iter().any(|c| c.starts_with("sign")));
}

#[tokio::test]
async fn test_unknown_app_fails_before_any_remote_call() {
    let harness = Harness::new(&[("foo", "v1.2.0")]);
    let pipeline = harness.pipeline(&[("foo", "v1.2.0")], vec![], false);

    let result = pipeline.build_app("bar").await;

    assert!(matches!(result, Err(ForgeError::RegistryNotFound { .. })));
    assert!(calls(&harness.log).is_empty());
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let harness = Harness::new(&[("alpha", ""), ("broken", ""), ("untagged", ""), ("omega", "")]);
    let pipeline = harness.pipeline(
        &[("alpha", "v1"), ("broken", "v2"), ("omega", "3.0")],
        vec!["broken"],
        false,
    );

    let report = pipeline.build_all().await.unwrap();

    let names: Vec<_> = report.entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "broken", "untagged", "omega"]);
    assert_eq!(report.failures(), 2);
    assert_eq!(report.succeeded(), 2);
    assert!(matches!(report.entries[1].1, Err(ForgeError::BuildFailure { .. })));
    assert!(matches!(report.entries[2].1, Err(ForgeError::VersionLookup { .. })));

    assert!(harness.out("alpha-v1/alpha-v1-unsigned.apk").is_file());
    assert!(harness.out("omega-3.0/omega-3.0-unsigned.apk").is_file());
}

#[tokio::test]
async fn test_batch_stops_on_corrupt_registry() {
    let harness = Harness::new(&[]);
    std::fs::create_dir_all(&harness.paths.root).unwrap();
    std::fs::write(harness.paths.registry_file(), "[{\"app\": 3}]").unwrap();
    let pipeline = harness.pipeline(&[], vec![], false);

    let result = pipeline.build_all().await;

    assert!(matches!(result, Err(ForgeError::RegistryCorrupt { .. })));
}

#[tokio::test]
async fn test_scratch_workspace_reset_between_runs() {
    let harness = Harness::new(&[("foo", "v1.2.0")]);
    let stale = harness.paths.working_dir.join("leftover/file.txt");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, b"stale").unwrap();

    harness
        .pipeline(&[("foo", "v1.2.0")], vec![], false)
        .build_app("foo")
        .await
        .unwrap();

    assert!(!stale.exists());
}

#[tokio::test]
async fn test_tag_with_slash_is_published_under_flat_name() {
    let harness = Harness::new(&[("foo", "")]);
    let pipeline = harness.pipeline(&[("foo", "app/v1.0")], vec![], true);

    let outcome = pipeline.build_app("foo").await.unwrap();

    let signed = harness.out("foo-app-v1.0/foo-app-v1.0-signed.apk");
    assert_eq!(outcome.artifact(), Some(&signed));
    assert!(signed.is_file());
}
