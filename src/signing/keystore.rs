use dialoguer::{theme::ColorfulTheme, Password};
use std::path::{Path, PathBuf};

use super::{KeystoreRecord, SigningTools};
use crate::{ForgeError, Result};

/// Shortest passphrase keytool accepts
pub const MIN_PASSPHRASE_LEN: usize = 6;

/// File name of the generated keystore inside the bin directory
pub const KEYSTORE_FILE: &str = "apkforge.keystore";

const PASSPHRASE_ATTEMPTS: usize = 3;

/// Supplies the passphrase for a new keystore
pub trait PassphraseSource: Send + Sync {
    fn passphrase(&self) -> Result<String>;
}

/// Asks on the terminal, without echo, until a long enough passphrase is entered
pub struct PromptPassphrase;

impl PassphraseSource for PromptPassphrase {
    fn passphrase(&self) -> Result<String> {
        for _ in 0..PASSPHRASE_ATTEMPTS {
            let passphrase = Password::with_theme(&ColorfulTheme::default())
                .with_prompt(format!(
                    "Passphrase for the new keystore (min {MIN_PASSPHRASE_LEN} characters)"
                ))
                .with_confirmation("Repeat passphrase", "Passphrases do not match")
                .interact()
                .map_err(|e| ForgeError::Signing(format!("Could not read passphrase: {e}")))?;

            match check_passphrase(&passphrase) {
                Ok(()) => return Ok(passphrase),
                Err(reason) => eprintln!("{reason}"),
            }
        }

        Err(ForgeError::Signing("No valid keystore passphrase entered".to_string()))
    }
}

/// Reject passphrases keytool would refuse
pub fn check_passphrase(passphrase: &str) -> std::result::Result<(), String> {
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(format!(
            "Keystore passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
        ));
    }
    Ok(())
}

/// Where the signing identity stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystoreState {
    NoKeystore,
    Ready(KeystoreRecord),
}

/// The installation's signing key, created lazily on first use
#[derive(Debug, Clone)]
pub struct Keystore {
    record_path: PathBuf,
    key_location: PathBuf,
    alias: String,
    validity_days: u32,
}

impl Keystore {
    pub fn new(bin_dir: &Path, record_path: PathBuf, alias: &str, validity_days: u32) -> Self {
        Self {
            record_path,
            key_location: bin_dir.join(KEYSTORE_FILE),
            alias: alias.to_string(),
            validity_days,
        }
    }

    pub fn state(&self) -> Result<KeystoreState> {
        Ok(match KeystoreRecord::load_from_path(&self.record_path)? {
            Some(record) => KeystoreState::Ready(record),
            None => KeystoreState::NoKeystore,
        })
    }

    /// Return the signing identity, generating it on the first request
    ///
    /// An existing record is never regenerated, even if its key file has
    /// gone missing.
    pub async fn ensure(
        &self,
        tools: &dyn SigningTools,
        passphrases: &dyn PassphraseSource,
    ) -> Result<KeystoreRecord> {
        if let KeystoreState::Ready(record) = self.state()? {
            if !record.key_location.is_file() {
                return Err(ForgeError::Signing(format!(
                    "Keystore record {} points at missing key {}",
                    self.record_path.display(),
                    record.key_location.display()
                )));
            }
            return Ok(record);
        }

        let passphrase = passphrases.passphrase()?;
        check_passphrase(&passphrase).map_err(ForgeError::Signing)?;

        if let Some(parent) = self.key_location.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ForgeError::Signing(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }

        let record = KeystoreRecord {
            key_location: self.key_location.clone(),
            alias: self.alias.clone(),
            passphrase,
            created: Some(chrono::Utc::now().to_rfc3339()),
        };

        tools.generate_key(&record, self.validity_days).await?;
        record.save_to_path(&self.record_path).map_err(|e| {
            ForgeError::Signing(format!(
                "Cannot write keystore record {}: {}",
                self.record_path.display(),
                e
            ))
        })?;

        tracing::warn!(
            "The keystore passphrase is stored in plaintext in {}; protect that file",
            self.record_path.display()
        );
        Ok(record)
    }
}
