use std::time::Duration;

use assert_matches::assert_matches;
use eoex_core::Role;
use eoex_core::UserDirectory;
use eoex_login::AuthClient;
use eoex_login::Credentials;
use eoex_login::HttpAuthClient;
use eoex_login::LoginError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn client_for(server: &MockServer) -> HttpAuthClient {
    HttpAuthClient::new(format!("{}/api/v1", server.uri()), Duration::from_secs(5))
        .expect("http client")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn successful_login_returns_token_and_user() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({
            "email": "support.l1@eoex.com",
            "password": "demo"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "token_type": "bearer",
            "user": {
                "user_id": "0b8f6c1e",
                "tenant_id": "a1",
                "email": "support.l1@eoex.com",
                "role": "service_level1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .login(&Credentials::new("support.l1@eoex.com", "demo"))
        .await?;
    let (identity, token) = response.into_session(&UserDirectory::default());

    assert_eq!(token.as_str(), "jwt-token");
    assert_eq!(identity.label, "Support L1");
    assert_eq!(identity.role, Role::from("service_level1"));
    server.verify().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unauthorized_maps_to_rejected_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"detail":"Invalid email or password"}"#),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .login(&Credentials::new("crm.manager@eoex.com", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_rejected());
    assert_eq!(err.to_string(), r#"{"detail":"Invalid email or password"}"#);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_error_body_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .login(&Credentials::new("ceo@eoex.com", "demo"))
        .await
        .unwrap_err();

    assert_matches!(err, LoginError::Rejected(message) if message == "Request failed (500)");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .login(&Credentials::new("ceo@eoex.com", "demo"))
        .await
        .unwrap_err();

    assert_matches!(err, LoginError::InvalidResponse(_));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_backend_is_transport_error() {
    let server = MockServer::start().await;
    let base = format!("{}/api/v1", server.uri());
    drop(server);

    let client = HttpAuthClient::new(base, Duration::from_secs(2)).expect("http client");
    let err = client
        .login(&Credentials::new("ceo@eoex.com", "demo"))
        .await
        .unwrap_err();

    assert_matches!(err, LoginError::Transport(_));
}
