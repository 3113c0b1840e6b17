use super::oauth_client;
use super::token::AccessToken;
use super::AuthError;
use crate::config::{Config, Credentials};
use std::time::Instant;
use tokio::sync::Mutex;
use url::Url;

/// Owns our access token, obtaining a new one whenever necessary.
///
/// Callers hold the lock across the entire check-and-refresh sequence.
/// If several requests find the token expired at once, only the first
/// performs an exchange; the remainder wait and then reuse its result.
#[derive(Debug)]
pub struct TokenManager {
    client: reqwest::Client,
    token_url: Url,
    credentials: Credentials,
    current: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            token_url: config.token_url.clone(),
            credentials: config.credentials.clone(),
            current: Mutex::new(None),
        }
    }

    /// Returns a bearer token that has not yet expired, exchanging our credentials if needed.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if !token.is_expired(Instant::now()) {
                return Ok(token.value.clone());
            }
            tracing::debug!("access token expired, refreshing");
        }

        let token =
            oauth_client::obtain_access_token(&self.client, &self.token_url, &self.credentials)
                .await
                .inspect_err(|err| tracing::warn!("token exchange failed: {err}"))?;
        tracing::info!("refreshed access token");

        // Even if already expired (i.e. a non-positive lifetime), we hand this token
        // to our caller. The next caller will find it expired and refresh again.
        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }

    /// Drops the cached token if it is still the one the API rejected, forcing the next call
    /// to refresh. A token refreshed by another caller in the meantime is left alone.
    pub async fn invalidate(&self, rejected: &str) {
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|token| token.value == rejected) {
            tracing::debug!("discarding rejected access token");
            *current = None;
        }
    }
}
