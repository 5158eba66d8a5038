use fabric_client::{strip_framing, FabricError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrantError {
    #[error("unknown organization: {0}")]
    UnknownOrganization(String),

    #[error("identity '{user}' not found in the {org} wallet")]
    IdentityNotFound { org: String, user: String },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("contract not found: {0}")]
    ContractNotFound(String),

    /// Chaincode declined the operation. Carries the framing-free message.
    #[error("{0}")]
    LedgerBusinessRejection(String),

    #[error("ledger transport failure: {0}")]
    LedgerTransportFailure(String),

    #[error("counterparty '{user}' is not enrolled with {org}")]
    ValidatorRejection { org: String, user: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid identity '{0}': must be 1-128 characters of letters, digits, '.', '_', '@' or '-'")]
    InvalidIdentity(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("connection profile unavailable: {0}")]
    ProfileUnavailable(String),

    #[error("identity store error: {0}")]
    IdentityStore(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<FabricError> for GrantError {
    fn from(err: FabricError) -> Self {
        match err {
            FabricError::ConnectionFailed(m) => GrantError::ConnectionFailed(m),
            FabricError::AuthenticationFailed { peer, reason } => {
                GrantError::AuthenticationFailed(format!("{peer}: {reason}"))
            }
            FabricError::ChannelNotFound(c) => GrantError::ChannelNotFound(c),
            FabricError::ContractNotFound { channel, contract } => {
                GrantError::ContractNotFound(format!("{contract} on {channel}"))
            }
            FabricError::Endorsement { message, .. } => {
                GrantError::LedgerBusinessRejection(strip_framing(&message).to_string())
            }
            FabricError::Transport(m) => GrantError::LedgerTransportFailure(m),
            FabricError::SessionClosed => {
                GrantError::LedgerTransportFailure("session already closed".into())
            }
            FabricError::Profile(m) => GrantError::ProfileUnavailable(m),
            FabricError::Wallet(m) => GrantError::IdentityStore(m),
            FabricError::Io(e) => GrantError::Io(e),
            FabricError::Json(e) => GrantError::Json(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrantError>;
