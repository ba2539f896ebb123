//! Artifact signing with a locally managed keystore
//!
//! Signing runs in two steps: zipalign writes an aligned copy of the
//! unsigned artifact, then apksigner writes the signed artifact from the
//! aligned one. Both intermediates are deleted once signing succeeds.

mod keystore;
mod record;
mod tools;

pub use keystore::{
    Keystore, KeystoreState, PassphraseSource, PromptPassphrase, KEYSTORE_FILE,
    MIN_PASSPHRASE_LEN,
};
pub use record::KeystoreRecord;
pub use tools::{latest_build_tools, resolve_sdk_root, AndroidSdkTools, SigningTools};

use std::path::{Path, PathBuf};

use crate::{ForgeError, Result};

/// Aligned and signed paths next to an unsigned artifact
///
/// `foo-v1-unsigned.apk` becomes `foo-v1-aligned.apk` and `foo-v1-signed.apk`.
pub fn signing_paths(unsigned: &Path) -> (PathBuf, PathBuf) {
    let file_name = unsigned
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact.apk");
    let (stem, extension) = file_name.rsplit_once('.').unwrap_or((file_name, "apk"));
    let base = stem.strip_suffix("-unsigned").unwrap_or(stem);

    (
        unsigned.with_file_name(format!("{base}-aligned.{extension}")),
        unsigned.with_file_name(format!("{base}-signed.{extension}")),
    )
}

/// Signs published artifacts
pub struct Signer {
    keystore: Keystore,
    tools: Box<dyn SigningTools>,
    passphrases: Box<dyn PassphraseSource>,
}

impl Signer {
    pub fn new(
        keystore: Keystore,
        tools: Box<dyn SigningTools>,
        passphrases: Box<dyn PassphraseSource>,
    ) -> Self {
        Self {
            keystore,
            tools,
            passphrases,
        }
    }

    /// Produce the signed artifact, leaving only it behind on success
    pub async fn sign(&self, unsigned: &Path) -> Result<PathBuf> {
        if !unsigned.is_file() {
            return Err(ForgeError::Signing(format!(
                "Unsigned artifact {} does not exist",
                unsigned.display()
            )));
        }

        let record = self
            .keystore
            .ensure(self.tools.as_ref(), self.passphrases.as_ref())
            .await?;
        let (aligned, signed) = signing_paths(unsigned);

        remove_if_exists(&aligned)?;

        tracing::info!("Aligning {}", unsigned.display());
        if let Err(e) = self.tools.align(unsigned, &aligned).await {
            remove_if_exists(&aligned)?;
            return Err(e);
        }

        tracing::info!("Signing {}", aligned.display());
        if let Err(e) = self.tools.sign(&record, &aligned, &signed).await {
            remove_if_exists(&aligned)?;
            return Err(e);
        }

        remove_if_exists(unsigned)?;
        remove_if_exists(&aligned)?;

        tracing::info!("Signed artifact at {}", signed.display());
        Ok(signed)
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ForgeError::Signing(format!(
            "Cannot remove {}: {}",
            path.display(),
            e
        ))),
    }
}
