use super::token::{AccessToken, TokenResponse};
use super::AuthError;
use crate::config::Credentials;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header;
use std::time::Instant;
use url::Url;

/// Builds the value for HTTP Basic authentication from our client credentials.
pub fn basic_authorization(credentials: &Credentials) -> String {
    let pair = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(pair))
}

/// Attempt to obtain an access token via the OAuth2 client credentials grant.
/// We authenticate with our client ID and secret via HTTP Basic authentication.
pub async fn obtain_access_token(
    client: &reqwest::Client,
    token_url: &Url,
    credentials: &Credentials,
) -> Result<AccessToken, AuthError> {
    let result = client
        .post(token_url.clone())
        .header(header::AUTHORIZATION, basic_authorization(credentials))
        .header(header::ACCEPT, "application/json")
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(AuthError::Transport)?;

    // Anything other than a 2xx means our credentials were not accepted.
    let status = result.status();
    if !status.is_success() {
        let body = result.text().await.unwrap_or_default();
        return Err(AuthError::Rejected { status, body });
    }

    // Take note of the time before parsing so that expiry errs on the early side.
    let issued_at = Instant::now();
    let response_text = result.text().await.map_err(AuthError::Transport)?;
    let response: TokenResponse =
        serde_json::from_str(&response_text).map_err(AuthError::Malformed)?;

    let expires_in = response.expires_in;
    tracing::debug!(expires_in, "obtained access token");
    AccessToken::issued(response, issued_at).ok_or(AuthError::InvalidLifetime(expires_in))
}
