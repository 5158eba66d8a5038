//! Session and transaction orchestration.
//!
//! Every call follows the same shape:
//!
//! ```text
//! validate → counterparty check → resolve profile → load identity
//!          → open session → bind channel/contract → evaluate | submit
//!          → close session
//! ```
//!
//! The session is owned by the call that opened it and is closed on every
//! exit path. Submit failures of any kind are folded into
//! `{status: "error", message}`; query failures are returned as errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fabric_client::{strip_framing, ConnectOptions, Connector, FabricError, LedgerSession};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::{GrantError, Result};
use crate::identity::IdentityStore;
use crate::operation::{validate_identity, LedgerCall, OperationKind, OperationRequest};
use crate::organization::Organization;
use crate::reply::{OperationResult, Reply};
use crate::resolver::ProfileResolver;
use crate::validator::WorkflowValidator;

pub struct Orchestrator {
    root: PathBuf,
    config: GatewayConfig,
    profiles: ProfileResolver,
    identities: IdentityStore,
    connector: Arc<dyn Connector>,
}

impl Orchestrator {
    pub fn new(root: impl Into<PathBuf>, config: GatewayConfig, connector: Arc<dyn Connector>) -> Self {
        let root = root.into();
        let profiles = ProfileResolver::new(&root, &config);
        let identities = IdentityStore::new(config.wallet_root(&root));
        Orchestrator {
            root,
            config,
            profiles,
            identities,
            connector,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileResolver {
        &self.profiles
    }

    pub fn identities(&self) -> &IdentityStore {
        &self.identities
    }

    /// Run one operation in its own session.
    pub async fn perform_operation(&self, request: &OperationRequest) -> Result<Reply> {
        let span = tracing::info_span!(
            "operation",
            op_id = %Uuid::new_v4(),
            org = %request.organization,
            user = %request.acting_identity,
            operation = request.operation.name(),
        );
        self.perform(request).instrument(span).await
    }

    /// MSP ids of every organization joined to the configured channel, as
    /// seen by `user_id` of `org`.
    pub async fn channel_msp_ids(&self, org: Organization, user_id: &str) -> Result<Vec<String>> {
        validate_identity(user_id)?;
        let mut session = self.open_session(org, user_id).await?;
        let msp_ids = session
            .channel(&self.config.channel)
            .map(|channel| channel.msp_ids().to_vec());
        session.close();
        Ok(msp_ids?)
    }

    async fn perform(&self, request: &OperationRequest) -> Result<Reply> {
        request.validate()?;
        let call = request.ledger_call()?;

        if let Some(counterparty) = request.operation.counterparty() {
            let org: Organization = counterparty.organization.parse()?;
            let user = counterparty.user_id.to_string();
            let identities = self.identities.clone();
            let enrolled = tokio::task::spawn_blocking(move || {
                WorkflowValidator::new(&identities).ensure_counterparty_exists(org, &user)
            })
            .await
            .map_err(|e| GrantError::IdentityStore(e.to_string()))?;
            if !enrolled {
                tracing::warn!(
                    counterparty_org = %org,
                    counterparty = counterparty.user_id,
                    "counterparty not enrolled; operation not sent"
                );
                return Ok(Reply::CounterpartyMissing);
            }
        }

        let mut session = self
            .open_session(request.organization, &request.acting_identity)
            .await?;
        let outcome = self.execute(&session, call).await;
        session.close();
        outcome
    }

    async fn open_session(&self, org: Organization, user_id: &str) -> Result<LedgerSession> {
        let profile = self.profiles.resolve(org)?;

        let identities = self.identities.clone();
        let user = user_id.to_string();
        let identity = tokio::task::spawn_blocking(move || identities.load(org, &user))
            .await
            .map_err(|e| GrantError::IdentityStore(e.to_string()))??;

        let options = self.config.connect_options();
        let limit = open_deadline(&options, profile.gateway_peers().len());
        let open = LedgerSession::open(
            self.connector.as_ref(),
            &profile,
            &identity,
            user_id,
            &options,
        );
        match tokio::time::timeout(limit, open).await {
            Ok(session) => Ok(session?),
            Err(_) => Err(GrantError::ConnectionFailed(format!(
                "no peer of '{}' answered within {}s",
                profile.name,
                limit.as_secs()
            ))),
        }
    }

    async fn execute(&self, session: &LedgerSession, call: LedgerCall) -> Result<Reply> {
        let contract = session
            .channel(&self.config.channel)?
            .contract(&self.config.chaincode)?;

        match call.kind {
            OperationKind::Query => {
                let limit = self.config.timeouts.evaluate();
                match tokio::time::timeout(limit, contract.evaluate(call.name, &call.public_args)).await {
                    Ok(Ok(payload)) => Ok(Reply::from_query_payload(&payload)),
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "query failed");
                        Err(e.into())
                    }
                    Err(_) => Err(GrantError::Timeout {
                        operation: call.name.to_string(),
                        secs: limit.as_secs(),
                    }),
                }
            }
            OperationKind::Submit => {
                let limit = self.config.timeouts.submit();
                let mut tx = contract.create_transaction(call.name);
                if !call.private_args.is_empty() {
                    tx.set_transient(call.private_args);
                }
                let result = match tokio::time::timeout(limit, tx.submit(&call.public_args)).await {
                    Ok(Ok(payload)) => OperationResult::success(&payload),
                    Ok(Err(e)) => OperationResult::error(normalize(&e)),
                    Err(_) => OperationResult::error(format!(
                        "{} timed out after {}s; the transaction may still commit",
                        call.name,
                        limit.as_secs()
                    )),
                };
                match &result.message {
                    Some(message) => tracing::warn!(%message, "submit failed"),
                    None => tracing::info!(status = %result.status, "submit committed"),
                }
                Ok(Reply::Submitted(result))
            }
        }
    }
}

/// Each peer gets `connect_timeout` before the next one is tried, plus one
/// more slot for setup.
fn open_deadline(options: &ConnectOptions, peers: usize) -> Duration {
    let slots = u32::try_from(peers.max(1)).unwrap_or(u32::MAX).saturating_add(1);
    options.connect_timeout.saturating_mul(slots)
}

/// Human-readable text of a submit failure.
fn normalize(err: &FabricError) -> String {
    match err {
        FabricError::Endorsement { message, .. } => strip_framing(message).to_string(),
        other => strip_framing(&other.to_string()).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
