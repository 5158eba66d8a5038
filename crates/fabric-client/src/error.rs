use thiserror::Error;

#[derive(Debug, Error)]
pub enum FabricError {
    #[error("no reachable peer: {0}")]
    ConnectionFailed(String),

    #[error("identity rejected by {peer}: {reason}")]
    AuthenticationFailed { peer: String, reason: String },

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("contract '{contract}' not found on channel '{channel}'")]
    ContractNotFound { channel: String, contract: String },

    /// The ledger answered and declined the proposal. `message` is the raw
    /// diagnostic, framing included.
    #[error("{message}")]
    Endorsement { status: u16, message: String },

    /// The ledger never produced an answer (network, TLS, timeout, decode).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("session already closed")]
    SessionClosed,

    #[error("invalid connection profile: {0}")]
    Profile(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FabricError {
    fn from(err: reqwest::Error) -> Self {
        FabricError::Transport(err.to_string())
    }
}

/// Strip endorsement-envelope framing from a ledger diagnostic.
///
/// Peers wrap chaincode errors as `... message=<text>`; only the text after
/// the last `message=` marker is meant for humans. Diagnostics without the
/// marker are returned trimmed but otherwise unchanged.
pub fn strip_framing(diagnostic: &str) -> &str {
    diagnostic
        .rsplit("message=")
        .next()
        .unwrap_or(diagnostic)
        .trim()
}
