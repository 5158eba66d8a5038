use std::collections::BTreeMap;

use crate::connector::{ChannelInfo, ConnectOptions, Connection, Connector, Proposal};
use crate::profile::ConnectionProfile;
use crate::wallet::Identity;
use crate::{FabricError, Result};

// ─── LedgerSession ────────────────────────────────────────────────────────

/// One logical connection to the network for one (organization, identity)
/// pair.
///
/// A session is owned by exactly one caller. Channels and contracts borrow
/// it, so it cannot be closed while a handle is alive. `close` is
/// idempotent and also runs on drop, so the underlying connection is
/// released exactly once on every exit path.
///
/// ```rust,ignore
/// let mut session = LedgerSession::open(&connector, &profile, &identity, "alice", &opts).await?;
/// let contract = session.channel("mychannel")?.contract("research-grant")?;
/// let grant = contract.evaluate("ReadGrant", &["g-1".into()]).await?;
/// session.close();
/// ```
pub struct LedgerSession {
    user_id: String,
    msp_id: String,
    connection: Box<dyn Connection>,
    closed: bool,
}

impl LedgerSession {
    pub async fn open(
        connector: &dyn Connector,
        profile: &ConnectionProfile,
        identity: &Identity,
        user_id: &str,
        options: &ConnectOptions,
    ) -> Result<Self> {
        let connection = connector
            .connect(profile, identity, user_id, options)
            .await?;
        tracing::info!(
            user = user_id,
            msp = %identity.msp_id,
            profile = %profile.name,
            channels = connection.discovery().channels.len(),
            "ledger session opened"
        );
        Ok(LedgerSession {
            user_id: user_id.to_string(),
            msp_id: identity.msp_id.clone(),
            connection,
            closed: false,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bind a channel the connection discovered.
    pub fn channel(&self, name: &str) -> Result<Channel<'_>> {
        self.ensure_open()?;
        let info = self
            .connection
            .discovery()
            .channels
            .get(name)
            .ok_or_else(|| FabricError::ChannelNotFound(name.to_string()))?;
        Ok(Channel {
            session: self,
            name: name.to_string(),
            info,
        })
    }

    /// Release the connection. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.connection.close();
        tracing::info!(user = %self.user_id, msp = %self.msp_id, "ledger session closed");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(FabricError::SessionClosed);
        }
        Ok(())
    }
}

impl Drop for LedgerSession {
    fn drop(&mut self) {
        self.close();
    }
}

// ─── Channel ──────────────────────────────────────────────────────────────

pub struct Channel<'s> {
    session: &'s LedgerSession,
    name: String,
    info: &'s ChannelInfo,
}

impl<'s> Channel<'s> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MSP ids of the organizations joined to this channel.
    pub fn msp_ids(&self) -> &'s [String] {
        &self.info.msp_ids
    }

    pub fn contract(&self, name: &str) -> Result<Contract<'s>> {
        if !self.info.contracts.iter().any(|c| c == name) {
            return Err(FabricError::ContractNotFound {
                channel: self.name.clone(),
                contract: name.to_string(),
            });
        }
        Ok(Contract {
            session: self.session,
            channel: self.name.clone(),
            name: name.to_string(),
        })
    }
}

// ─── Contract ─────────────────────────────────────────────────────────────

pub struct Contract<'s> {
    session: &'s LedgerSession,
    channel: String,
    name: String,
}

impl<'s> Contract<'s> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run a read-only function against one peer. Nothing is ordered or
    /// committed and no transient data is sent.
    pub async fn evaluate(&self, transaction: &str, arguments: &[String]) -> Result<Vec<u8>> {
        self.session.ensure_open()?;
        let proposal = Proposal {
            channel: self.channel.clone(),
            contract: self.name.clone(),
            transaction: transaction.to_string(),
            arguments: arguments.to_vec(),
            transient: BTreeMap::new(),
        };
        self.session.connection.evaluate(&proposal).await
    }

    pub fn create_transaction(&self, transaction: &str) -> Transaction<'s> {
        Transaction {
            session: self.session,
            channel: self.channel.clone(),
            contract: self.name.clone(),
            name: transaction.to_string(),
            transient: BTreeMap::new(),
        }
    }
}

// ─── Transaction ──────────────────────────────────────────────────────────

/// A state-changing invocation being assembled. Consumed by `submit`, so
/// one `Transaction` produces at most one submission.
pub struct Transaction<'s> {
    session: &'s LedgerSession,
    channel: String,
    contract: String,
    name: String,
    transient: BTreeMap<String, Vec<u8>>,
}

impl Transaction<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach private fields delivered to endorsing peers only.
    pub fn set_transient(&mut self, transient: BTreeMap<String, Vec<u8>>) -> &mut Self {
        self.transient = transient;
        self
    }

    pub async fn submit(self, arguments: &[String]) -> Result<Vec<u8>> {
        self.session.ensure_open()?;
        let proposal = Proposal {
            channel: self.channel,
            contract: self.contract,
            transaction: self.name,
            arguments: arguments.to_vec(),
            transient: self.transient,
        };
        self.session.connection.submit(&proposal).await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
