use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use grant_core::GrantError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(GrantError::InvalidPayload(msg.into()).into())
    }
}

fn status_for(e: &GrantError) -> StatusCode {
    match e {
        GrantError::UnknownOrganization(_)
        | GrantError::InvalidPayload(_)
        | GrantError::InvalidIdentity(_) => StatusCode::BAD_REQUEST,
        GrantError::IdentityNotFound { .. }
        | GrantError::ChannelNotFound(_)
        | GrantError::ContractNotFound(_) => StatusCode::NOT_FOUND,
        GrantError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
        GrantError::LedgerBusinessRejection(_) | GrantError::ValidatorRejection { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GrantError::ConnectionFailed(_) | GrantError::LedgerTransportFailure(_) => {
            StatusCode::BAD_GATEWAY
        }
        GrantError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        GrantError::ProfileUnavailable(_)
        | GrantError::IdentityStore(_)
        | GrantError::Io(_)
        | GrantError::Yaml(_)
        | GrantError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<GrantError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
