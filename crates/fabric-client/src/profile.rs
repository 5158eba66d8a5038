//! Connection profiles: the static network topology and TLS material an
//! organization needs to reach its peers and ordering service.
//!
//! The JSON layout follows the common connection-profile convention
//! (`client`, `organizations`, `peers`, `orderers`, optional `channels`).
//! Unknown sections (certificate authorities, grpc tuning, …) are ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{FabricError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub organizations: BTreeMap<String, OrganizationSection>,
    #[serde(default)]
    pub peers: BTreeMap<String, Endpoint>,
    #[serde(default)]
    pub orderers: BTreeMap<String, Endpoint>,
    /// Static channel layout, consulted only when discovery is disabled.
    #[serde(default)]
    pub channels: BTreeMap<String, StaticChannel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSection {
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSection {
    pub mspid: String,
    #[serde(default)]
    pub peers: Vec<String>,
    #[serde(default, rename = "certificateAuthorities")]
    pub certificate_authorities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    #[serde(default, rename = "tlsCACerts")]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsCaCerts {
    #[serde(default)]
    pub pem: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticChannel {
    #[serde(default)]
    pub msp_ids: Vec<String>,
    #[serde(default)]
    pub contracts: Vec<String>,
}

impl ConnectionProfile {
    /// Read a profile from disk. TLS roots given by `path` are inlined,
    /// resolved relative to the profile's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| FabricError::Profile(format!("{}: {e}", path.display())))?;
        let mut profile = Self::from_json(&data)?;
        let base = path.parent().unwrap_or(Path::new("."));
        for endpoint in profile.peers.values_mut().chain(profile.orderers.values_mut()) {
            endpoint.inline_tls_root(base)?;
        }
        Ok(profile)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let profile: ConnectionProfile = serde_json::from_str(data)
            .map_err(|e| FabricError::Profile(format!("malformed profile: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.peers.is_empty() {
            return Err(FabricError::Profile(format!(
                "profile '{}' defines no peers",
                self.name
            )));
        }
        if let Some(org) = &self.client.organization {
            let section = self.organizations.get(org).ok_or_else(|| {
                FabricError::Profile(format!("client organization '{org}' is not defined"))
            })?;
            for peer in &section.peers {
                if !self.peers.contains_key(peer) {
                    return Err(FabricError::Profile(format!(
                        "organization '{org}' references undefined peer '{peer}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The section describing the organization this profile connects as.
    pub fn client_organization(&self) -> Option<&OrganizationSection> {
        self.client
            .organization
            .as_ref()
            .and_then(|o| self.organizations.get(o))
    }

    /// Peers a session may use as its gateway, in preference order: the
    /// client organization's own peers first, otherwise every peer.
    pub fn gateway_peers(&self) -> Vec<(&str, &Endpoint)> {
        match self.client_organization() {
            Some(org) if !org.peers.is_empty() => org
                .peers
                .iter()
                .filter_map(|name| self.peers.get_key_value(name))
                .map(|(k, v)| (k.as_str(), v))
                .collect(),
            _ => self.peers.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        }
    }

    /// Every inline TLS root in the profile.
    pub fn tls_roots(&self) -> Vec<&str> {
        self.peers
            .values()
            .chain(self.orderers.values())
            .filter_map(|e| e.tls_ca_certs.as_ref())
            .filter_map(|t| t.pem.as_deref())
            .collect()
    }
}

impl Endpoint {
    /// HTTP(S) address for this endpoint. `grpc`/`grpcs` schemes map onto
    /// `http`/`https`; with `as_localhost` the host is replaced by
    /// `localhost`, keeping the port.
    pub fn http_url(&self, as_localhost: bool) -> Result<String> {
        let (scheme, rest) = self
            .url
            .split_once("://")
            .ok_or_else(|| FabricError::Profile(format!("endpoint url without scheme: {}", self.url)))?;
        let scheme = match scheme {
            "grpc" | "http" => "http",
            "grpcs" | "https" => "https",
            other => {
                return Err(FabricError::Profile(format!(
                    "unsupported endpoint scheme '{other}'"
                )))
            }
        };
        let rest = rest.trim_end_matches('/');
        let authority = if as_localhost {
            match rest.rsplit_once(':') {
                Some((_, port)) => format!("localhost:{port}"),
                None => "localhost".to_string(),
            }
        } else {
            rest.to_string()
        };
        Ok(format!("{scheme}://{authority}"))
    }

    fn inline_tls_root(&mut self, base: &Path) -> Result<()> {
        if let Some(tls) = self.tls_ca_certs.as_mut() {
            if tls.pem.is_none() {
                if let Some(path) = &tls.path {
                    let full = base.join(path);
                    let pem = std::fs::read_to_string(&full).map_err(|e| {
                        FabricError::Profile(format!("TLS root {}: {e}", full.display()))
                    })?;
                    tls.pem = Some(pem);
                }
            }
        }
        Ok(())
    }
}
