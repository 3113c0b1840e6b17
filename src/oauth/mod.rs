mod oauth_client;
mod token;
mod token_manager;

pub use token_manager::TokenManager;

/// Possible issues while obtaining an access token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed token response: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("malformed token response: expires_in of {0} seconds is out of range")]
    InvalidLifetime(i64),
}
