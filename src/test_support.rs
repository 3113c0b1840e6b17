//! Shared fixtures for tests that talk to a mock management API.

use crate::api::ApiClient;
use crate::config::{Config, API_URL_VAR, CLIENT_ID_VAR, CLIENT_SECRET_VAR};
use mockito::{Mock, Server};
use serde_json::json;

/// Configuration pointed at the given mock server.
pub fn config_for(server: &Server) -> Config {
    let url = server.url();
    Config::from_lookup(|name| match name {
        CLIENT_ID_VAR => Some("client".to_string()),
        CLIENT_SECRET_VAR => Some("secret".to_string()),
        API_URL_VAR => Some(url.clone()),
        _ => None,
    })
    .expect("mock server URL should be a valid configuration")
}

/// An API client pointed at the given mock server.
pub fn client_for(server: &Server) -> ApiClient {
    ApiClient::from_config(&config_for(server)).expect("HTTP client should build")
}

/// Mocks a token endpoint issuing `token` for `expires_in` seconds, expected to be hit `hits` times.
pub async fn mock_token(server: &mut Server, token: &str, expires_in: i64, hits: usize) -> Mock {
    server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": token,
                "token_type": "Bearer",
                "expires_in": expires_in,
            })
            .to_string(),
        )
        .expect(hits)
        .create_async()
        .await
}
