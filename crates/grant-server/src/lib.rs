pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Operations
        .route("/api/operations", post(routes::operations::perform_operation))
        // Grants (read-only shortcuts)
        .route("/api/grants", get(routes::grants::list_grants))
        .route("/api/grants/{id}", get(routes::grants::get_grant))
        .route("/api/grants/{id}/payments", get(routes::grants::get_payments))
        .route("/api/grants/{id}/progress", get(routes::grants::get_progress))
        .route(
            "/api/grants/{id}/remaining",
            get(routes::grants::get_remaining_amount),
        )
        // Channel
        .route("/api/channel/msp-ids", get(routes::channel::msp_ids))
        // Identities
        .route(
            "/api/identities/{org}",
            get(routes::identities::list_identities),
        )
        .route(
            "/api/identities/{org}/{user_id}/exists",
            get(routes::identities::identity_exists),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the gateway API server.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the gateway API server on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful when `port = 0` and the
/// OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let config = app_state.orchestrator.config();
    tracing::info!(
        channel = %config.channel,
        chaincode = %config.chaincode,
        "grant gateway listening on http://localhost:{actual_port}"
    );

    let app = build_router(app_state);
    axum::serve(listener, app).await?;
    Ok(())
}
