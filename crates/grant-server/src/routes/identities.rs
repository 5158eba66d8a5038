use axum::extract::{Path, State};
use axum::Json;
use grant_core::{validate_identity, Organization};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/identities/:org: enrolled identity labels.
pub async fn list_identities(
    State(app): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let org: Organization = org.parse()?;
    let store = app.orchestrator.identities().clone();
    let labels = tokio::task::spawn_blocking(move || store.list(org))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "org": org, "identities": labels })))
}

/// GET /api/identities/:org/:user_id/exists
pub async fn identity_exists(
    State(app): State<AppState>,
    Path((org, user_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let org: Organization = org.parse()?;
    validate_identity(&user_id)?;
    let store = app.orchestrator.identities().clone();
    let user = user_id.clone();
    let exists = tokio::task::spawn_blocking(move || store.exists(org, &user))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(serde_json::json!({
        "org": org,
        "userId": user_id,
        "exists": exists,
    })))
}
