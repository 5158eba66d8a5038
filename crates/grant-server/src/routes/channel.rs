use axum::extract::{Query, State};
use axum::Json;
use grant_core::Organization;

use crate::error::AppError;
use crate::state::AppState;

use super::ActorQuery;

/// GET /api/channel/msp-ids: organizations joined to the configured channel.
pub async fn msp_ids(
    State(app): State<AppState>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let org: Organization = actor.org.parse()?;
    let ids = app.orchestrator.channel_msp_ids(org, &actor.user_id).await?;
    Ok(Json(serde_json::json!(ids)))
}
