use axum::http::StatusCode;
use fabric_client::{Identity, Wallet};
use grant_core::{GatewayConfig, Organization};
use grant_server::AppState;
use http_body_util::BodyExt;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DISCOVERY: &str = r#"{"channels":{"mychannel":{"msp_ids":["GrantorMSP","AwardeeMSP","AuditorMSP","SubawardeeMSP"],"contracts":["research-grant"]}}}"#;

/// Lay out profiles pointing at `gateway_url` and enroll alice (Grantor) and
/// bob (Awardee).
fn init_root(dir: &TempDir, gateway_url: &str) -> AppState {
    let mut config = GatewayConfig::default();
    config.discovery.as_localhost = false;
    for org in Organization::all() {
        let path = config.profile_path(dir.path(), *org);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let profile = json!({
            "name": format!("test-network-{}", org.slug()),
            "client": { "organization": org.as_str() },
            "organizations": { org.as_str(): { "mspid": org.msp_id(), "peers": ["peer0"] } },
            "peers": { "peer0": { "url": gateway_url } }
        });
        std::fs::write(&path, profile.to_string()).unwrap();
    }

    let app = AppState::for_root(dir.path().to_path_buf(), config);
    let store = app.orchestrator.identities();
    store
        .wallet(Organization::Grantor)
        .put("alice", &Identity::x509("GrantorMSP", "CERT", "KEY"))
        .unwrap();
    store
        .wallet(Organization::Awardee)
        .put("bob", &Identity::x509("AwardeeMSP", "CERT", "KEY"))
        .unwrap();
    app
}

async fn gateway() -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/discovery")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DISCOVERY)
        .create_async()
        .await;
    server
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Submits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initiate_grant_returns_ledger_status() {
    let mut server = gateway().await;
    let submit = server
        .mock("POST", "/submit")
        .match_header("x-fabric-user", "alice")
        .match_body(Matcher::PartialJson(json!({
            "channel": "mychannel",
            "contract": "research-grant",
            "transaction": "InitiateGrant",
            "arguments": []
        })))
        .with_status(200)
        .with_body("grant-0001")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = post_json(
        app,
        "/api/operations",
        json!({
            "org": "grantor",
            "userId": "alice",
            "operation": "InitiateGrant",
            "data": { "ID": "grant-0001", "amount": 1000, "description": "Soil study" }
        }),
    )
    .await;

    submit.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "grant-0001" }));
}

#[tokio::test]
async fn rejected_submit_is_normalized_not_an_http_error() {
    let mut server = gateway().await;
    server
        .mock("POST", "/submit")
        .with_status(500)
        .with_body("No valid responses from any peers. Errors:\n peer=peer0:7051, status=500, message=grant amount must be greater than 0")
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = post_json(
        app,
        "/api/operations",
        json!({
            "org": "Grantor",
            "userId": "alice",
            "operation": "InitiateGrant",
            "data": { "ID": "grant-0002", "amount": 0 }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "error", "message": "grant amount must be greater than 0" })
    );
}

#[tokio::test]
async fn assign_to_unenrolled_awardee_answers_false_without_touching_the_ledger() {
    let mut server = Server::new_async().await;
    let discovery = server
        .mock("GET", "/discovery")
        .expect(0)
        .create_async()
        .await;
    let submit = server.mock("POST", "/submit").expect(0).create_async().await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = post_json(
        app,
        "/api/operations",
        json!({
            "org": "grantor",
            "userId": "alice",
            "operation": "AssignGrant",
            "data": {
                "grant_id": "grant-0001",
                "awardee": [{ "id": "ghost", "organization": "Awardee" }],
                "status": "Assigned"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(false));
    discovery.assert_async().await;
    submit.assert_async().await;
}

#[tokio::test]
async fn assign_to_enrolled_awardee_sends_transient_assignment() {
    let mut server = gateway().await;
    let submit = server
        .mock("POST", "/submit")
        .match_body(Matcher::Regex(r#""assign_grant":""#.to_string()))
        .with_status(200)
        .with_body("true")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = post_json(
        app,
        "/api/operations",
        json!({
            "org": "grantor",
            "userId": "alice",
            "operation": "AssignGrant",
            "data": {
                "grant_id": "grant-0001",
                "awardee": [{ "id": "bob", "organization": "AwardeeMSP" }]
            }
        }),
    )
    .await;

    submit.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "true" }));
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_grant_returns_ledger_json() {
    let mut server = gateway().await;
    server
        .mock("POST", "/evaluate")
        .match_body(Matcher::PartialJson(json!({
            "transaction": "ReadGrant",
            "arguments": ["grant-0001"],
            "transient": {}
        })))
        .with_status(200)
        .with_body(r#"{"ID":"grant-0001","amount":1000,"status":"Initiated"}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = get(app, "/api/grants/grant-0001?org=grantor&userId=alice").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Initiated");
    assert_eq!(body["amount"], 1000);
}

#[tokio::test]
async fn missing_grant_is_a_visible_error() {
    let mut server = gateway().await;
    server
        .mock("POST", "/evaluate")
        .with_status(500)
        .with_body("evaluate failed: status=500, message=the grant grant-42 does not exist")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = get(app, "/api/grants/grant-42?org=grantor&userId=alice").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "the grant grant-42 does not exist");
}

#[tokio::test]
async fn list_grants_by_status_uses_status_query() {
    let mut server = gateway().await;
    let m = server
        .mock("POST", "/evaluate")
        .match_body(Matcher::PartialJson(json!({
            "transaction": "GetGrantsByStatus",
            "arguments": ["Accepted"]
        })))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = get(app, "/api/grants?org=awardee&userId=bob&status=Accepted").await;

    m.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn msp_ids_lists_channel_members() {
    let server = gateway().await;
    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = get(app, "/api/channel/msp-ids?org=grantor&userId=alice").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!(["GrantorMSP", "AwardeeMSP", "AuditorMSP", "SubawardeeMSP"])
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_organization_is_400() {
    let server = gateway().await;
    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = post_json(
        app,
        "/api/operations",
        json!({ "org": "funder", "userId": "alice", "operation": "GetAllGrants" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown organization"));
}

#[tokio::test]
async fn unknown_operation_is_400() {
    let server = gateway().await;
    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = post_json(
        app,
        "/api/operations",
        json!({ "org": "grantor", "userId": "alice", "operation": "MintTokens" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unenrolled_caller_is_404() {
    let server = gateway().await;
    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, body) = get(app, "/api/grants/grant-0001?org=auditor&userId=dave").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "identity 'dave' not found in the Auditor wallet");
}

#[tokio::test]
async fn rejected_certificate_is_401() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/discovery")
        .with_status(403)
        .with_body("access denied")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, &server.url()));
    let (status, _) = get(app, "/api/grants/grant-0001?org=grantor&userId=alice").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unreachable_network_is_502() {
    let dir = TempDir::new().unwrap();
    let app = grant_server::build_router(init_root(&dir, "http://127.0.0.1:1"));
    let (status, body) = get(app, "/api/grants/grant-0001?org=grantor&userId=alice").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().starts_with("connection failed"));
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identity_exists_route() {
    let dir = TempDir::new().unwrap();
    let app = init_root(&dir, "http://127.0.0.1:1");

    let (status, body) = get(
        grant_server::build_router(app.clone()),
        "/api/identities/awardee/bob/exists",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);

    let (status, body) = get(
        grant_server::build_router(app),
        "/api/identities/Awardee/ghost/exists",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);
}
