pub mod config;
pub mod identity;
pub mod invoke;
pub mod msp_ids;
pub mod profile;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use fabric_client::HttpConnector;
use grant_core::{GatewayConfig, Orchestrator};

/// Command-line / environment values that win over `gateway.yaml`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub channel: Option<String>,
    pub chaincode: Option<String>,
}

pub fn load_config(root: &Path, overrides: &Overrides) -> anyhow::Result<GatewayConfig> {
    let mut config = GatewayConfig::load(root)
        .with_context(|| format!("loading {}", GatewayConfig::path(root).display()))?;
    if let Some(channel) = &overrides.channel {
        config.channel = channel.clone();
    }
    if let Some(chaincode) = &overrides.chaincode {
        config.chaincode = chaincode.clone();
    }
    Ok(config)
}

pub fn orchestrator(root: &Path, overrides: &Overrides) -> anyhow::Result<Orchestrator> {
    let config = load_config(root, overrides)?;
    Ok(Orchestrator::new(
        root,
        config,
        Arc::new(HttpConnector::new()),
    ))
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("starting async runtime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn overrides_win_over_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            GatewayConfig::path(dir.path()),
            "channel: filechannel\nchaincode: filecc\n",
        )
        .unwrap();

        let config = load_config(dir.path(), &Overrides::default()).unwrap();
        assert_eq!(config.channel, "filechannel");

        let overrides = Overrides {
            channel: Some("grants".into()),
            chaincode: None,
        };
        let config = load_config(dir.path(), &overrides).unwrap();
        assert_eq!(config.channel, "grants");
        assert_eq!(config.chaincode, "filecc");
    }

    #[test]
    fn malformed_config_names_the_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(GatewayConfig::path(dir.path()), "timeouts: [").unwrap();
        let err = load_config(dir.path(), &Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").contains("gateway.yaml"));
    }
}
