use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::profile::ConnectionProfile;
use crate::wallet::Identity;
use crate::Result;

// ─── ConnectOptions ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Locate channels and peers at connect time instead of trusting the
    /// profile's static `channels` section.
    pub discovery: bool,
    /// Rewrite every endpoint host to `localhost` (network running locally
    /// behind published ports).
    pub as_localhost: bool,
    pub connect_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            discovery: true,
            as_localhost: true,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

// ─── Discovery ────────────────────────────────────────────────────────────

/// What a connection learned about the network when it was established.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub msp_ids: Vec<String>,
    #[serde(default)]
    pub contracts: Vec<String>,
}

impl Discovery {
    /// Channel layout declared statically in a profile.
    pub fn from_profile(profile: &ConnectionProfile) -> Self {
        let channels = profile
            .channels
            .iter()
            .map(|(name, ch)| {
                (
                    name.clone(),
                    ChannelInfo {
                        msp_ids: ch.msp_ids.clone(),
                        contracts: ch.contracts.clone(),
                    },
                )
            })
            .collect();
        Discovery { channels }
    }
}

// ─── Proposal ─────────────────────────────────────────────────────────────

/// One invocation of a named contract function.
///
/// `transient` travels to endorsing peers only and is never part of the
/// recorded transaction; it is always empty for evaluations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub channel: String,
    pub contract: String,
    pub transaction: String,
    pub arguments: Vec<String>,
    pub transient: BTreeMap<String, Vec<u8>>,
}

// ─── Transport seam ───────────────────────────────────────────────────────

/// Establishes authenticated connections to the ledger network.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        identity: &Identity,
        user_id: &str,
        options: &ConnectOptions,
    ) -> Result<Box<dyn Connection>>;
}

/// A live, identity-bound link to the network.
///
/// `evaluate` simulates on a single peer and never reaches ordering.
/// `submit` blocks until endorsement, ordering and commit complete or a
/// definitive rejection arrives. Implementations never retry a submit.
#[async_trait]
pub trait Connection: Send + Sync {
    fn discovery(&self) -> &Discovery;

    async fn evaluate(&self, proposal: &Proposal) -> Result<Vec<u8>>;

    async fn submit(&self, proposal: &Proposal) -> Result<Vec<u8>>;

    /// Release network resources. Called exactly once by the owning session.
    fn close(&mut self);
}
