use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Normalized outcome of a submit.
///
/// `status` is the ledger's confirmation payload on success, or the literal
/// `"error"` with a human-readable `message` on any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const ERROR_STATUS: &str = "error";

impl OperationResult {
    pub fn success(payload: &[u8]) -> Self {
        OperationResult {
            status: String::from_utf8_lossy(payload).into_owned(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        OperationResult {
            status: ERROR_STATUS.to_string(),
            message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ERROR_STATUS && self.message.is_some()
    }
}

/// What `perform_operation` hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Submitted(OperationResult),
    /// Query payload, parsed as JSON when possible.
    Queried(Value),
    /// The counterparty named by the operation is not enrolled; no session
    /// was opened. Serializes as `false`.
    CounterpartyMissing,
}

impl Reply {
    pub fn from_query_payload(payload: &[u8]) -> Self {
        let value = serde_json::from_slice(payload)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()));
        Reply::Queried(value)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Submitted(r) if r.is_error())
    }
}

impl Serialize for Reply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reply::Submitted(r) => r.serialize(serializer),
            Reply::Queried(v) => v.serialize(serializer),
            Reply::CounterpartyMissing => serializer.serialize_bool(false),
        }
    }
}
