//! Shared test helpers: mock API + identity provider on one wiremock server.
#![allow(dead_code)]

use std::sync::Arc;

use authgate::auth::WaitStrategy;
use authgate::config::{GatewayConfig, API_TARGET};
use authgate::gateway::Gateway;
use authgate::session::{InMemorySessionStore, SessionState};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "client-1";
pub const TOKEN_PATH: &str = "/oauth/v2/token";

pub fn session(access: Option<&str>, refresh: Option<&str>) -> Arc<InMemorySessionStore> {
    Arc::new(InMemorySessionStore::with_state(SessionState {
        access_token: access.map(String::from),
        refresh_token: refresh.map(String::from),
        token_validated: access.is_some(),
    }))
}

pub fn config(server: &MockServer) -> GatewayConfig {
    GatewayConfig::new()
        .with_base_url(API_TARGET, format!("{}/api", server.uri()))
        .with_identity_provider(server.uri(), CLIENT_ID)
}

pub fn gateway(server: &MockServer, session: Arc<InMemorySessionStore>) -> Gateway {
    gateway_with_wait(server, session, WaitStrategy::Broadcast)
}

pub fn gateway_with_wait(
    server: &MockServer,
    session: Arc<InMemorySessionStore>,
    wait: WaitStrategy,
) -> Gateway {
    let config = config(server).with_refresh_wait(wait);
    Gateway::new(&config, session).expect("gateway")
}

/// Token endpoint that expects `refresh_token` and answers with `response`.
pub async fn mount_token_endpoint(
    server: &MockServer,
    refresh_token: &str,
    response: ResponseTemplate,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(query_param("grant_type", "refresh_token"))
        .and(query_param("client_id", CLIENT_ID))
        .and(query_param("refresh_token", refresh_token))
        .and(header("content-type", "application/json"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// API route that answers `status` when called with `Bearer <token>`.
pub async fn mount_api(
    server: &MockServer,
    route: &str,
    token: &str,
    response: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// `Authorization` header of every request the server saw on `route`.
pub async fn authorization_headers(server: &MockServer, route: &str) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == route)
        .map(|req| {
            req.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        })
        .collect()
}

pub async fn token_calls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == TOKEN_PATH)
        .count()
}
