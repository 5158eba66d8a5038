use axum::extract::{Path, Query, State};
use axum::Json;
use grant_core::{GrantOperation, OperationRequest, Reply};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

use super::ActorQuery;

async fn read_as(
    app: &AppState,
    actor: ActorQuery,
    operation: GrantOperation,
) -> Result<Json<Reply>, AppError> {
    let request = OperationRequest::parse(&actor.org, actor.user_id, operation)?;
    Ok(Json(app.orchestrator.perform_operation(&request).await?))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(flatten)]
    pub actor: ActorQuery,
    pub status: Option<String>,
}

/// GET /api/grants: every grant visible to the caller, optionally filtered
/// by `?status=`.
pub async fn list_grants(
    State(app): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Reply>, AppError> {
    let operation = match q.status {
        Some(status) => GrantOperation::GetGrantsByStatus { status },
        None => GrantOperation::GetAllGrants,
    };
    read_as(&app, q.actor, operation).await
}

/// GET /api/grants/:id
pub async fn get_grant(
    State(app): State<AppState>,
    Path(grant_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<Reply>, AppError> {
    read_as(&app, actor, GrantOperation::ReadGrant { grant_id }).await
}

/// GET /api/grants/:id/payments
pub async fn get_payments(
    State(app): State<AppState>,
    Path(grant_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<Reply>, AppError> {
    read_as(&app, actor, GrantOperation::GetPayments { grant_id }).await
}

/// GET /api/grants/:id/progress
pub async fn get_progress(
    State(app): State<AppState>,
    Path(grant_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<Reply>, AppError> {
    read_as(&app, actor, GrantOperation::GetProgress { grant_id }).await
}

/// GET /api/grants/:id/remaining
pub async fn get_remaining_amount(
    State(app): State<AppState>,
    Path(grant_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<Reply>, AppError> {
    read_as(&app, actor, GrantOperation::GetRemainingAmount { grant_id }).await
}
