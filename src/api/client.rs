use crate::config::Config;
use crate::oauth::{AuthError, TokenManager};
use reqwest::{header, Method, StatusCode};
use serde_json::Value;
use url::Url;

/// Query parameters attached to a request, in order.
pub type Query = Vec<(&'static str, String)>;

#[derive(Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    /// Base of the management API, always ending in `/`.
    base_url: Url,
    /// Our sole source of bearer tokens across API requests.
    tokens: TokenManager,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid path {path:?}: {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },
    #[error("invalid ICCID {0:?}: expected only letters and digits")]
    InvalidIccid(String),
}

impl ApiClient {
    /// Creates a new API client around the given token manager.
    pub fn new(client: reqwest::Client, base_url: Url, tokens: TokenManager) -> Self {
        Self {
            client,
            base_url,
            tokens,
        }
    }

    /// Creates an API client and its token manager sharing a single HTTP client.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let tokens = TokenManager::new(client.clone(), config);
        Ok(Self::new(client, config.api_url.clone(), tokens))
    }

    /// Performs an authenticated request against the API, returning its JSON response verbatim.
    ///
    /// `path` is relative to the API base (e.g. `v1/sims`). Empty responses are returned as `null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        json_body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidPath {
                path: path.to_string(),
                source,
            })?;

        let access_token = self.tokens.get_token().await?;

        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&access_token)
            .header(header::ACCEPT, "application/json");
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = json_body {
            request = request.json(body);
        }

        let result = request.send().await.map_err(ApiError::Transport)?;
        let status = result.status();
        tracing::debug!(%method, path, status = status.as_u16(), "API request completed");

        // The API no longer accepts our token (e.g. revoked early), so don't present it again.
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate(&access_token).await;
        }

        let response_text = result.text().await.map_err(ApiError::Transport)?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: response_text,
            });
        }

        // Some endpoints (e.g. resets) acknowledge with no body at all.
        if response_text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response_text).map_err(ApiError::Decode)
    }

    pub async fn get(&self, path: &str, query: Option<&Query>) -> Result<Value, ApiError> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, json_body: Option<&Value>) -> Result<Value, ApiError> {
        self.request(Method::POST, path, None, json_body).await
    }

    pub async fn put(&self, path: &str, json_body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, None, Some(json_body)).await
    }
}
