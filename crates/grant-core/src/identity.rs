use std::path::{Path, PathBuf};

use fabric_client::{FileSystemWallet, Identity, Wallet};

use crate::error::{GrantError, Result};
use crate::organization::Organization;

/// Read access to the per-organization wallets under one root directory:
/// `<root>/<Organization>/<user>.id`.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    root: PathBuf,
}

impl IdentityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        IdentityStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn wallet(&self, org: Organization) -> FileSystemWallet {
        FileSystemWallet::new(self.root.join(org.as_str()))
    }

    pub fn load(&self, org: Organization, user_id: &str) -> Result<Identity> {
        let identity = self
            .wallet(org)
            .get(user_id)?
            .ok_or_else(|| GrantError::IdentityNotFound {
                org: org.to_string(),
                user: user_id.to_string(),
            })?;
        if identity.msp_id != org.msp_id() {
            tracing::warn!(
                %org,
                user = user_id,
                msp = %identity.msp_id,
                "identity was issued by a different MSP than its wallet suggests"
            );
        }
        Ok(identity)
    }

    /// `false` for absent identities. Storage errors are logged and also
    /// reported as `false`.
    pub fn exists(&self, org: Organization, user_id: &str) -> bool {
        match self.wallet(org).exists(user_id) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%org, user = user_id, error = %e, "identity lookup failed");
                false
            }
        }
    }

    pub fn list(&self, org: Organization) -> Result<Vec<String>> {
        Ok(self.wallet(org).list()?)
    }
}
