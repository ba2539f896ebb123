use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::KeystoreRecord;
use crate::config::Settings;
use crate::host::parse_version;
use crate::process::Command;
use crate::{ForgeError, Result};

/// Environment variable carrying the passphrase to keytool/apksigner
const PASSPHRASE_ENV: &str = "APKFORGE_KEYSTORE_PASS";

/// The external key-generation, alignment and signing utilities
#[async_trait]
pub trait SigningTools: Send + Sync {
    /// Create the keystore described by `record`
    async fn generate_key(&self, record: &KeystoreRecord, validity_days: u32) -> Result<()>;

    async fn align(&self, input: &Path, output: &Path) -> Result<()>;

    async fn sign(&self, record: &KeystoreRecord, input: &Path, output: &Path) -> Result<()>;
}

/// keytool from the JDK, zipalign and apksigner from the newest SDK build-tools
pub struct AndroidSdkTools {
    keytool: String,
    sdk_root: Option<PathBuf>,
}

impl AndroidSdkTools {
    pub fn new(keytool: impl Into<String>, sdk_root: Option<PathBuf>) -> Self {
        Self {
            keytool: keytool.into(),
            sdk_root,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new("keytool", resolve_sdk_root(settings.android_sdk_root.clone()))
    }

    fn build_tool(&self, tool: &str) -> Result<PathBuf> {
        let sdk_root = self.sdk_root.as_deref().ok_or_else(|| {
            ForgeError::Signing(
                "Android SDK not found; set ANDROID_SDK_ROOT or android_sdk_root in apkforge.yaml"
                    .to_string(),
            )
        })?;

        let dir = latest_build_tools(sdk_root)?;
        let name = if cfg!(windows) {
            match tool {
                "apksigner" => "apksigner.bat".to_string(),
                _ => format!("{tool}.exe"),
            }
        } else {
            tool.to_string()
        };

        let path = dir.join(name);
        if !path.is_file() {
            return Err(ForgeError::Signing(format!("{} not found", path.display())));
        }
        Ok(path)
    }
}

#[async_trait]
impl SigningTools for AndroidSdkTools {
    async fn generate_key(&self, record: &KeystoreRecord, validity_days: u32) -> Result<()> {
        tracing::info!("Generating keystore at {}", record.key_location.display());

        Command::new(&self.keytool)
            .args(["-genkeypair", "-noprompt", "-keystore"])
            .arg(record.key_location.to_string_lossy())
            .arg("-alias")
            .arg(&record.alias)
            .args(["-keyalg", "RSA", "-keysize", "2048", "-validity"])
            .arg(validity_days.to_string())
            .args(["-dname", "CN=apkforge"])
            .arg("-storepass:env")
            .arg(PASSPHRASE_ENV)
            .arg("-keypass:env")
            .arg(PASSPHRASE_ENV)
            .env(PASSPHRASE_ENV, &record.passphrase)
            .execute_checked()
            .await
            .map_err(|e| ForgeError::Signing(format!("keytool failed: {e}")))?;
        Ok(())
    }

    async fn align(&self, input: &Path, output: &Path) -> Result<()> {
        let zipalign = self.build_tool("zipalign")?;

        Command::new(zipalign.to_string_lossy())
            .args(["-f", "-p", "4"])
            .arg(input.to_string_lossy())
            .arg(output.to_string_lossy())
            .execute_checked()
            .await
            .map_err(|e| ForgeError::Signing(format!("zipalign failed: {e}")))?;
        Ok(())
    }

    async fn sign(&self, record: &KeystoreRecord, input: &Path, output: &Path) -> Result<()> {
        let apksigner = self.build_tool("apksigner")?;
        let pass = format!("env:{PASSPHRASE_ENV}");

        Command::new(apksigner.to_string_lossy())
            .arg("sign")
            .arg("--ks")
            .arg(record.key_location.to_string_lossy())
            .arg("--ks-key-alias")
            .arg(&record.alias)
            .arg("--ks-pass")
            .arg(&pass)
            .arg("--key-pass")
            .arg(&pass)
            .arg("--out")
            .arg(output.to_string_lossy())
            .arg(input.to_string_lossy())
            .env(PASSPHRASE_ENV, &record.passphrase)
            .execute_checked()
            .await
            .map_err(|e| ForgeError::Signing(format!("apksigner failed: {e}")))?;
        Ok(())
    }
}

/// SDK location from settings, then ANDROID_SDK_ROOT, then ANDROID_HOME
pub fn resolve_sdk_root(configured: Option<PathBuf>) -> Option<PathBuf> {
    configured.or_else(|| {
        ["ANDROID_SDK_ROOT", "ANDROID_HOME"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(PathBuf::from)
            .find(|path| !path.as_os_str().is_empty())
    })
}

/// The highest-versioned directory under `<sdk>/build-tools`
pub fn latest_build_tools(sdk_root: &Path) -> Result<PathBuf> {
    let build_tools = sdk_root.join("build-tools");
    let entries = std::fs::read_dir(&build_tools).map_err(|e| {
        ForgeError::Signing(format!("Cannot read {}: {}", build_tools.display(), e))
    })?;

    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let version = parse_version(e.file_name().to_str()?)?;
            Some((version, e.path()))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, path)| path)
        .ok_or_else(|| {
            ForgeError::Signing(format!("No build-tools installed in {}", build_tools.display()))
        })
}
