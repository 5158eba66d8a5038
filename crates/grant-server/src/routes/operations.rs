use axum::extract::State;
use axum::Json;
use grant_core::{GrantOperation, OperationRequest, Reply};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// `{"org", "userId", "operation", ...operation fields}`
#[derive(Debug, Deserialize)]
pub struct OperationBody {
    pub org: String,
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: String,
    #[serde(flatten)]
    pub operation: GrantOperation,
}

/// POST /api/operations: perform any grant operation.
///
/// Submits answer `{"status": ...}` (with `"message"` when `status` is
/// `"error"`), queries answer the ledger's JSON, and an operation naming an
/// unenrolled counterparty answers `false`.
pub async fn perform_operation(
    State(app): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Reply>, AppError> {
    let body: OperationBody =
        serde_json::from_value(body).map_err(|e| AppError::bad_request(e.to_string()))?;
    let request = OperationRequest::parse(&body.org, body.user_id, body.operation)?;
    let reply = app.orchestrator.perform_operation(&request).await?;
    Ok(Json(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_flattens_operation_fields() {
        let body: OperationBody = serde_json::from_value(json!({
            "org": "grantor",
            "userId": "alice",
            "operation": "RejectReimbursement",
            "grant_id": "g-1",
            "payment_id": "p-2",
            "message": "no receipt"
        }))
        .unwrap();
        assert_eq!(body.org, "grantor");
        assert_eq!(body.user_id, "alice");
        assert_eq!(body.operation.name(), "RejectReimbursement");
    }

    #[test]
    fn body_without_operation_is_rejected() {
        let r = serde_json::from_value::<OperationBody>(json!({ "org": "grantor", "userId": "alice" }));
        assert!(r.is_err());
    }
}
