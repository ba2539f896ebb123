//! Pipeline orchestration
//!
//! Registry -> version -> (skip if published) -> acquire -> build ->
//! artifact -> optional signing. Apps are processed one at a time; in batch
//! mode a failing app is reported and the next one starts.

mod register;

pub use register::{register, register_from_list, RegistrationReport};

use std::path::PathBuf;

use crate::acquire::{SourceAcquirer, UpstreamSource};
use crate::artifact::{ArtifactFinder, OutputLayout};
use crate::build::{BuildTool, GradleWrapper};
use crate::config::Settings;
use crate::host::{resolve_version, ReleaseHost, UpstreamHosts};
use crate::io::ForgePaths;
use crate::registry::{AppDescriptor, Registry};
use crate::signing::{AndroidSdkTools, Keystore, PromptPassphrase, Signer};
use crate::Result;

/// What a successful pipeline run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The version was published by an earlier run; nothing was rebuilt
    AlreadyBuilt {
        tag: String,
        artifact: Option<PathBuf>,
    },
    Built {
        tag: String,
        artifact: PathBuf,
        signed: bool,
    },
}

impl BuildOutcome {
    pub fn artifact(&self) -> Option<&PathBuf> {
        match self {
            BuildOutcome::AlreadyBuilt { artifact, .. } => artifact.as_ref(),
            BuildOutcome::Built { artifact, .. } => Some(artifact),
        }
    }
}

/// Per-app results of a batch run, in registry order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<(String, Result<BuildOutcome>)>,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.len() - self.failures()
    }
}

/// Sequences the pipeline stages for one or all registered apps
pub struct Pipeline {
    paths: ForgePaths,
    registry: Registry,
    host: Box<dyn ReleaseHost>,
    acquirer: Box<dyn SourceAcquirer>,
    builder: Box<dyn BuildTool>,
    finder: ArtifactFinder,
    layout: OutputLayout,
    signer: Option<Signer>,
}

impl Pipeline {
    pub fn new(
        paths: ForgePaths,
        host: Box<dyn ReleaseHost>,
        acquirer: Box<dyn SourceAcquirer>,
        builder: Box<dyn BuildTool>,
        finder: ArtifactFinder,
    ) -> Self {
        Self {
            registry: Registry::new(paths.registry_file()),
            layout: OutputLayout::new(paths.out_dir.clone()),
            paths,
            host,
            acquirer,
            builder,
            finder,
            signer: None,
        }
    }

    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Wire up the real collaborators from settings
    pub fn from_settings(paths: ForgePaths, settings: &Settings, sign: bool) -> Result<Self> {
        let pipeline = Self::new(
            paths.clone(),
            Box::new(UpstreamHosts::from_settings(settings)?),
            Box::new(UpstreamSource::from_settings(settings)?),
            Box::new(GradleWrapper::from_settings(settings)?),
            ArtifactFinder::from_settings(settings)?,
        );

        if !sign {
            return Ok(pipeline);
        }

        let keystore = Keystore::new(
            &paths.bin_dir,
            paths.keystore_record_file(),
            &settings.key_alias,
            settings.key_validity_days,
        );
        let signer = Signer::new(
            keystore,
            Box::new(AndroidSdkTools::from_settings(settings)),
            Box::new(PromptPassphrase),
        );
        Ok(pipeline.with_signer(signer))
    }

    /// Single-app mode: any failure aborts and is returned
    pub async fn build_app(&self, name: &str) -> Result<BuildOutcome> {
        let app = self.registry.lookup(name)?;
        self.prepare()?;
        self.run(&app).await
    }

    /// Batch mode: every registered app, failures isolated per app
    pub async fn build_all(&self) -> Result<BatchReport> {
        let apps = self.registry.list()?;
        self.prepare()?;

        let mut report = BatchReport::default();
        for app in apps {
            tracing::info!("Building {}", app.name);
            match self.run(&app).await {
                Err(e) if e.is_batch_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping {} after failure: {}", app.name, e);
                    report.entries.push((app.name, Err(e)));
                }
                Ok(outcome) => report.entries.push((app.name, Ok(outcome))),
            }
        }

        Ok(report)
    }

    /// Clear the scratch workspace and make sure the persistent dirs exist
    fn prepare(&self) -> Result<()> {
        self.paths.reset_working_dir()?;
        self.paths.ensure_directories()
    }

    async fn run(&self, app: &AppDescriptor) -> Result<BuildOutcome> {
        let tag = resolve_version(self.host.as_ref(), app).await?;

        if self.layout.is_published(&app.name, &tag) {
            tracing::info!("{} {} is already built, skipping", app.name, tag);
            return self.finish_published(app, tag).await;
        }

        let workspace = self.paths.app_workspace(&app.name);
        if workspace.exists() {
            std::fs::remove_dir_all(&workspace)?;
        }

        let tree = self.acquirer.acquire(app, &tag, &workspace).await?;
        self.builder.invoke(&app.name, &tree).await?;

        let artifact = self.finder.find(&workspace)?;
        let unsigned = self.layout.publish(&app.name, &tag, &artifact)?;

        match &self.signer {
            Some(signer) => {
                let signed = signer.sign(&unsigned).await?;
                Ok(BuildOutcome::Built {
                    tag,
                    artifact: signed,
                    signed: true,
                })
            }
            None => Ok(BuildOutcome::Built {
                tag,
                artifact: unsigned,
                signed: false,
            }),
        }
    }

    /// An earlier run published this version; sign it if that run could not
    async fn finish_published(&self, app: &AppDescriptor, tag: String) -> Result<BuildOutcome> {
        let unsigned = self.layout.unsigned_path(&app.name, &tag);
        let artifact = match &self.signer {
            Some(signer) if unsigned.is_file() && !self.layout.signed_path(&app.name, &tag).exists() => {
                Some(signer.sign(&unsigned).await?)
            }
            _ => self.layout.published_artifact(&app.name, &tag),
        };

        Ok(BuildOutcome::AlreadyBuilt { tag, artifact })
    }
}
