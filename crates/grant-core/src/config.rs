use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fabric_client::ConnectOptions;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::organization::Organization;

pub const CONFIG_FILE: &str = "gateway.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub message: String,
}

// ---------------------------------------------------------------------------
// DiscoveryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub as_localhost: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            as_localhost: true,
        }
    }
}

// ---------------------------------------------------------------------------
// TimeoutConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,
    #[serde(default = "default_evaluate_secs")]
    pub evaluate_secs: u64,
    #[serde(default = "default_submit_secs")]
    pub submit_secs: u64,
}

fn default_connect_secs() -> u64 {
    10
}

fn default_evaluate_secs() -> u64 {
    30
}

fn default_submit_secs() -> u64 {
    120
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            evaluate_secs: default_evaluate_secs(),
            submit_secs: default_submit_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn evaluate(&self) -> Duration {
        Duration::from_secs(self.evaluate_secs)
    }

    pub fn submit(&self) -> Duration {
        Duration::from_secs(self.submit_secs)
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// GatewayConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_chaincode")]
    pub chaincode: String,
    /// Holds one sub-directory per organization.
    #[serde(default = "default_wallet_dir")]
    pub wallet_dir: PathBuf,
    /// Connection profile per organization. Organizations left out use
    /// `profiles/connection-<org>.json`.
    #[serde(default)]
    pub profiles: BTreeMap<Organization, PathBuf>,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_channel() -> String {
    "mychannel".to_string()
}

fn default_chaincode() -> String {
    "research-grant".to_string()
}

fn default_wallet_dir() -> PathBuf {
    PathBuf::from("wallet")
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            chaincode: default_chaincode(),
            wallet_dir: default_wallet_dir(),
            profiles: BTreeMap::new(),
            discovery: DiscoveryConfig::default(),
            timeouts: TimeoutConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load `<root>/gateway.yaml`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: GatewayConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn profile_path(&self, root: &Path, org: Organization) -> PathBuf {
        let rel = self
            .profiles
            .get(&org)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(format!("profiles/connection-{}.json", org.slug())));
        root.join(rel)
    }

    pub fn wallet_root(&self, root: &Path) -> PathBuf {
        root.join(&self.wallet_dir)
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            discovery: self.discovery.enabled,
            as_localhost: self.discovery.as_localhost,
            connect_timeout: Duration::from_secs(self.timeouts.connect_secs),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut warn = |message: String| warnings.push(ConfigWarning { message });

        if self.channel.trim().is_empty() {
            warn("channel is empty".to_string());
        }
        if self.chaincode.trim().is_empty() {
            warn("chaincode is empty".to_string());
        }
        for (name, secs) in [
            ("connect_secs", self.timeouts.connect_secs),
            ("evaluate_secs", self.timeouts.evaluate_secs),
            ("submit_secs", self.timeouts.submit_secs),
        ] {
            if secs == 0 {
                warn(format!("timeouts.{name} is 0; every call will time out"));
            }
        }
        for org in Organization::all() {
            let path = self.profile_path(root, *org);
            if !path.exists() {
                warn(format!(
                    "no connection profile for {org} at {}",
                    path.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
