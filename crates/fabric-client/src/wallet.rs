use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{FabricError, Result};

// ─── Identity ─────────────────────────────────────────────────────────────

/// A signing credential: X.509 certificate plus private key, bound to the
/// MSP that issued it.
///
/// Serialized in the conventional wallet `.id` layout:
/// `{"credentials":{"certificate","privateKey"},"mspId","type":"X.509","version":1}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub credentials: Credentials,
    pub msp_id: String,
    #[serde(rename = "type", default = "default_identity_type")]
    pub kind: String,
    #[serde(default = "default_version")]
    pub version: u32,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub certificate: String,
    pub private_key: String,
}

fn default_identity_type() -> String {
    "X.509".to_string()
}

fn default_version() -> u32 {
    1
}

impl Identity {
    pub fn x509(
        msp_id: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Identity {
            credentials: Credentials {
                certificate: certificate.into(),
                private_key: private_key.into(),
            },
            msp_id: msp_id.into(),
            kind: default_identity_type(),
            version: default_version(),
        }
    }

    pub fn certificate(&self) -> &str {
        &self.credentials.certificate
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("msp_id", &self.msp_id)
            .field("kind", &self.kind)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

// ─── Wallet ───────────────────────────────────────────────────────────────

/// Durable credential storage keyed by identity label.
pub trait Wallet: Send + Sync {
    fn get(&self, label: &str) -> Result<Option<Identity>>;
    fn put(&self, label: &str, identity: &Identity) -> Result<()>;
    fn remove(&self, label: &str) -> Result<()>;
    fn list(&self) -> Result<Vec<String>>;

    fn exists(&self, label: &str) -> Result<bool> {
        Ok(self.get(label)?.is_some())
    }
}

/// Wallet backed by one `<label>.id` file per identity in a directory.
///
/// The directory is created lazily on the first `put`; reading from a
/// directory that does not exist yet behaves as an empty wallet.
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    dir: PathBuf,
}

const ID_EXTENSION: &str = "id";

impl FileSystemWallet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSystemWallet { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, label: &str) -> Result<PathBuf> {
        if label.is_empty()
            || label.contains(['/', '\\'])
            || label.starts_with('.')
        {
            return Err(FabricError::Wallet(format!("invalid identity label '{label}'")));
        }
        Ok(self.dir.join(format!("{label}.{ID_EXTENSION}")))
    }
}

impl Wallet for FileSystemWallet {
    fn get(&self, label: &str) -> Result<Option<Identity>> {
        let path = self.path(label)?;
        let data = match std::fs::read_to_string(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FabricError::Io(e)),
        };
        let identity = serde_json::from_str(&data)
            .map_err(|e| FabricError::Wallet(format!("{}: {e}", path.display())))?;
        Ok(Some(identity))
    }

    fn put(&self, label: &str, identity: &Identity) -> Result<()> {
        let path = self.path(label)?;
        std::fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_vec(identity)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&data)?;
        tmp.persist(&path).map_err(|e| FabricError::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, label: &str) -> Result<()> {
        let path = self.path(label)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FabricError::Io(e)),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FabricError::Io(e)),
        };
        let mut labels = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ID_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                labels.push(stem.to_string());
            }
        }
        labels.sort();
        Ok(labels)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
