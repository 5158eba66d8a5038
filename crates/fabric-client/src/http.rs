//! HTTP gateway transport.
//!
//! Speaks JSON to a peer-side gateway:
//!
//! ```text
//! GET  {peer}/discovery  → {"channels": {"<name>": {"msp_ids": [...], "contracts": [...]}}}
//! POST {peer}/evaluate   ← {"channel","contract","transaction","arguments","transient":{}}
//! POST {peer}/submit     ← same, transient values base64-encoded
//! ```
//!
//! The caller's identity travels in `x-fabric-msp-id`, `x-fabric-user` and
//! `x-fabric-certificate` (base64 PEM). The private key never leaves the
//! process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Serialize;

use crate::connector::{ConnectOptions, Connection, Connector, Discovery, Proposal};
use crate::profile::ConnectionProfile;
use crate::wallet::Identity;
use crate::{FabricError, Result};

const HEADER_MSP_ID: &str = "x-fabric-msp-id";
const HEADER_USER: &str = "x-fabric-user";
const HEADER_CERTIFICATE: &str = "x-fabric-certificate";

// ─── HttpConnector ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct HttpConnector;

impl HttpConnector {
    pub fn new() -> Self {
        HttpConnector
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        identity: &Identity,
        user_id: &str,
        options: &ConnectOptions,
    ) -> Result<Box<dyn Connection>> {
        let client = build_client(profile, options)?;
        let headers = identity_headers(identity, user_id)?;
        let peers = profile.gateway_peers();

        if !options.discovery {
            let (name, peer) = peers.first().ok_or_else(|| {
                FabricError::ConnectionFailed(format!("profile '{}' has no peers", profile.name))
            })?;
            let endpoint = peer.http_url(options.as_localhost)?;
            tracing::debug!(peer = %name, %endpoint, "discovery disabled, using static channel layout");
            return Ok(Box::new(HttpConnection {
                client: Some(client),
                endpoint,
                headers,
                discovery: Discovery::from_profile(profile),
            }));
        }

        let mut failures = Vec::new();
        for (name, peer) in peers {
            let endpoint = match peer.http_url(options.as_localhost) {
                Ok(u) => u,
                Err(e) => {
                    failures.push(format!("{name}: {e}"));
                    continue;
                }
            };
            let response = client
                .get(format!("{endpoint}/discovery"))
                .headers(headers.clone())
                .timeout(options.connect_timeout)
                .send()
                .await;
            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(peer = %name, error = %e, "discovery attempt failed");
                    failures.push(format!("{name}: {e}"));
                    continue;
                }
            };
            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let reason = response.text().await.unwrap_or_default();
                return Err(FabricError::AuthenticationFailed {
                    peer: name.to_string(),
                    reason: if reason.is_empty() {
                        status.to_string()
                    } else {
                        reason
                    },
                });
            }
            if !status.is_success() {
                failures.push(format!("{name}: discovery returned {status}"));
                continue;
            }
            let discovery: Discovery = match response.json().await {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!(peer = %name, error = %e, "discovery answer unreadable");
                    failures.push(format!("{name}: unreadable discovery answer: {e}"));
                    continue;
                }
            };
            tracing::debug!(peer = %name, %endpoint, "discovery succeeded");
            return Ok(Box::new(HttpConnection {
                client: Some(client),
                endpoint,
                headers,
                discovery,
            }));
        }

        Err(FabricError::ConnectionFailed(if failures.is_empty() {
            format!("profile '{}' has no peers", profile.name)
        } else {
            failures.join("; ")
        }))
    }
}

fn build_client(profile: &ConnectionProfile, options: &ConnectOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().connect_timeout(options.connect_timeout);
    for pem in profile.tls_roots() {
        let cert = reqwest::Certificate::from_pem(pem.as_bytes())
            .map_err(|e| FabricError::Profile(format!("bad TLS root: {e}")))?;
        builder = builder.add_root_certificate(cert);
    }
    Ok(builder.build()?)
}

fn identity_headers(identity: &Identity, user_id: &str) -> Result<HeaderMap> {
    let value = |v: &str| {
        HeaderValue::from_str(v)
            .map_err(|_| FabricError::Wallet(format!("identity field not header-safe: {v}")))
    };
    let cert = base64::engine::general_purpose::STANDARD.encode(identity.certificate());
    let mut headers = HeaderMap::new();
    headers.insert(HEADER_MSP_ID, value(&identity.msp_id)?);
    headers.insert(HEADER_USER, value(user_id)?);
    headers.insert(HEADER_CERTIFICATE, value(&cert)?);
    Ok(headers)
}

// ─── HttpConnection ───────────────────────────────────────────────────────

struct HttpConnection {
    /// `None` once closed.
    client: Option<reqwest::Client>,
    endpoint: String,
    headers: HeaderMap,
    discovery: Discovery,
}

#[derive(Serialize)]
struct WireProposal<'a> {
    channel: &'a str,
    contract: &'a str,
    transaction: &'a str,
    arguments: &'a [String],
    transient: BTreeMap<&'a str, String>,
}

impl<'a> WireProposal<'a> {
    fn from_proposal(p: &'a Proposal) -> Self {
        let engine = base64::engine::general_purpose::STANDARD;
        WireProposal {
            channel: &p.channel,
            contract: &p.contract,
            transaction: &p.transaction,
            arguments: &p.arguments,
            transient: p
                .transient
                .iter()
                .map(|(k, v)| (k.as_str(), engine.encode(v)))
                .collect(),
        }
    }
}

impl HttpConnection {
    async fn post(&self, path: &str, proposal: &Proposal) -> Result<Vec<u8>> {
        let client = self.client.as_ref().ok_or(FabricError::SessionClosed)?;
        let response = client
            .post(format!("{}/{path}", self.endpoint))
            .headers(self.headers.clone())
            .json(&WireProposal::from_proposal(proposal))
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() {
            return Ok(body.to_vec());
        }
        let message = String::from_utf8_lossy(&body).into_owned();
        match status {
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                Err(FabricError::Transport(format!("{status}: {message}")))
            }
            _ => Err(FabricError::Endorsement {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

#[async_trait]
impl Connection for HttpConnection {
    fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    async fn evaluate(&self, proposal: &Proposal) -> Result<Vec<u8>> {
        self.post("evaluate", proposal).await
    }

    async fn submit(&self, proposal: &Proposal) -> Result<Vec<u8>> {
        self.post("submit", proposal).await
    }

    fn close(&mut self) {
        self.client = None;
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const DISCOVERY: &str = r#"{"channels":{"mychannel":{"msp_ids":["GrantorMSP"],"contracts":["research-grant"]}}}"#;

    fn profile_for(urls: &[&str]) -> ConnectionProfile {
        let peers: serde_json::Map<String, serde_json::Value> = urls
            .iter()
            .enumerate()
            .map(|(i, u)| (format!("peer{i}"), json!({ "url": u })))
            .collect();
        let names: Vec<String> = (0..urls.len()).map(|i| format!("peer{i}")).collect();
        let raw = json!({
            "name": "test",
            "client": { "organization": "Grantor" },
            "organizations": { "Grantor": { "mspid": "GrantorMSP", "peers": names } },
            "peers": peers,
            "channels": { "static": { "msp_ids": ["GrantorMSP"], "contracts": ["research-grant"] } }
        });
        ConnectionProfile::from_json(&raw.to_string()).unwrap()
    }

    fn options() -> ConnectOptions {
        ConnectOptions {
            as_localhost: false,
            ..ConnectOptions::default()
        }
    }

    fn identity() -> Identity {
        Identity::x509("GrantorMSP", "CERT", "KEY")
    }

    fn proposal(transient: BTreeMap<String, Vec<u8>>) -> Proposal {
        Proposal {
            channel: "mychannel".into(),
            contract: "research-grant".into(),
            transaction: "InitiateGrant".into(),
            arguments: vec!["g-1".into()],
            transient,
        }
    }

    #[tokio::test]
    async fn connect_discovers_channels_with_identity_headers() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/discovery")
            .match_header(HEADER_USER, "alice")
            .match_header(HEADER_MSP_ID, "GrantorMSP")
            .match_header(HEADER_CERTIFICATE, "Q0VSVA==")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DISCOVERY)
            .create_async()
            .await;

        let conn = HttpConnector::new()
            .connect(&profile_for(&[&server.url()]), &identity(), "alice", &options())
            .await
            .unwrap();
        m.assert_async().await;
        assert!(conn.discovery().channels.contains_key("mychannel"));
    }

    #[tokio::test]
    async fn connect_fails_over_to_next_peer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body(DISCOVERY)
            .create_async()
            .await;

        let profile = profile_for(&["http://127.0.0.1:1", &server.url()]);
        let conn = HttpConnector::new()
            .connect(&profile, &identity(), "alice", &options())
            .await
            .unwrap();
        assert_eq!(conn.discovery().channels.len(), 1);
    }

    /// A peer that accepts TCP connections and never answers.
    async fn silent_peer() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn stalled_peer_is_skipped_after_connect_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body(DISCOVERY)
            .create_async()
            .await;

        let profile = profile_for(&[&silent_peer().await, &server.url()]);
        let opts = ConnectOptions {
            connect_timeout: std::time::Duration::from_secs(1),
            ..options()
        };
        let conn = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            HttpConnector::new().connect(&profile, &identity(), "alice", &opts),
        )
        .await
        .expect("connect must not hang on a silent peer")
        .unwrap();
        assert!(conn.discovery().channels.contains_key("mychannel"));
    }

    #[tokio::test]
    async fn only_stalled_peers_is_connection_failed() {
        let profile = profile_for(&[&silent_peer().await]);
        let opts = ConnectOptions {
            connect_timeout: std::time::Duration::from_secs(1),
            ..options()
        };
        let err = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            HttpConnector::new().connect(&profile, &identity(), "alice", &opts),
        )
        .await
        .expect("connect must not hang on a silent peer")
        .err()
        .unwrap();
        assert!(matches!(err, FabricError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn unreadable_discovery_answer_fails_over() {
        let mut proxy = mockito::Server::new_async().await;
        proxy
            .mock("GET", "/discovery")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>proxy</html>")
            .create_async()
            .await;
        let mut server = mockito::Server::new_async().await;
        let good = server
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body(DISCOVERY)
            .create_async()
            .await;

        let profile = profile_for(&[&proxy.url(), &server.url()]);
        let conn = HttpConnector::new()
            .connect(&profile, &identity(), "alice", &options())
            .await
            .unwrap();
        good.assert_async().await;
        assert!(conn.discovery().channels.contains_key("mychannel"));
    }

    #[tokio::test]
    async fn unreadable_discovery_everywhere_is_connection_failed() {
        let mut proxy = mockito::Server::new_async().await;
        proxy
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body("<html>proxy</html>")
            .create_async()
            .await;

        let err = HttpConnector::new()
            .connect(&profile_for(&[&proxy.url()]), &identity(), "alice", &options())
            .await
            .err()
            .unwrap();
        match err {
            FabricError::ConnectionFailed(m) => assert!(m.contains("unreadable discovery answer")),
            other => panic!("expected ConnectionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_without_reachable_peer_is_connection_failed() {
        let profile = profile_for(&["http://127.0.0.1:1"]);
        let err = HttpConnector::new()
            .connect(&profile, &identity(), "alice", &options())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FabricError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn rejected_identity_is_authentication_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/discovery")
            .with_status(401)
            .with_body("certificate not issued by GrantorMSP")
            .create_async()
            .await;

        let err = HttpConnector::new()
            .connect(&profile_for(&[&server.url()]), &identity(), "alice", &options())
            .await
            .err()
            .unwrap();
        match err {
            FabricError::AuthenticationFailed { reason, .. } => {
                assert!(reason.contains("not issued"))
            }
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn discovery_disabled_uses_static_channels() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/discovery")
            .expect(0)
            .create_async()
            .await;

        let opts = ConnectOptions {
            discovery: false,
            ..options()
        };
        let conn = HttpConnector::new()
            .connect(&profile_for(&[&server.url()]), &identity(), "alice", &opts)
            .await
            .unwrap();
        m.assert_async().await;
        assert!(conn.discovery().channels.contains_key("static"));
    }

    #[tokio::test]
    async fn submit_sends_base64_transient_and_returns_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body(DISCOVERY)
            .create_async()
            .await;
        let m = server
            .mock("POST", "/submit")
            .match_body(Matcher::PartialJson(json!({
                "transaction": "InitiateGrant",
                "arguments": ["g-1"],
                "transient": { "grant": "e30=" }
            })))
            .with_status(200)
            .with_body("true")
            .create_async()
            .await;

        let conn = HttpConnector::new()
            .connect(&profile_for(&[&server.url()]), &identity(), "alice", &options())
            .await
            .unwrap();
        let out = conn
            .submit(&proposal(BTreeMap::from([("grant".to_string(), b"{}".to_vec())])))
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(out, b"true");
    }

    #[tokio::test]
    async fn evaluate_error_status_is_endorsement() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body(DISCOVERY)
            .create_async()
            .await;
        server
            .mock("POST", "/evaluate")
            .with_status(500)
            .with_body("status=500, message=the grant g-1 does not exist")
            .create_async()
            .await;

        let conn = HttpConnector::new()
            .connect(&profile_for(&[&server.url()]), &identity(), "alice", &options())
            .await
            .unwrap();
        let err = conn.evaluate(&proposal(BTreeMap::new())).await.unwrap_err();
        match err {
            FabricError::Endorsement { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(crate::strip_framing(&message), "the grant g-1 does not exist");
            }
            other => panic!("expected Endorsement, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unavailable_gateway_is_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body(DISCOVERY)
            .create_async()
            .await;
        server
            .mock("POST", "/submit")
            .with_status(503)
            .with_body("orderer unavailable")
            .create_async()
            .await;

        let conn = HttpConnector::new()
            .connect(&profile_for(&[&server.url()]), &identity(), "alice", &options())
            .await
            .unwrap();
        let err = conn.submit(&proposal(BTreeMap::new())).await.unwrap_err();
        assert!(matches!(err, FabricError::Transport(_)));
    }

    #[tokio::test]
    async fn closed_connection_refuses_calls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/discovery")
            .with_status(200)
            .with_body(DISCOVERY)
            .create_async()
            .await;

        let mut conn = HttpConnector::new()
            .connect(&profile_for(&[&server.url()]), &identity(), "alice", &options())
            .await
            .unwrap();
        conn.close();
        let err = conn.evaluate(&proposal(BTreeMap::new())).await.unwrap_err();
        assert!(matches!(err, FabricError::SessionClosed));
    }
}
