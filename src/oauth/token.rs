use serde::Deserialize;
use std::time::{Duration, Instant};

/// The response format from the token endpoint.
/// Other fields (e.g. `token_type`, `scope`) may be present, but are of no use to us.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of the token, in seconds. We've no guarantee this is positive.
    pub expires_in: i64,
}

/// A bearer token alongside the point in time it stops being valid.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Instant,
}

impl AccessToken {
    /// Computes the absolute expiry of a freshly issued token.
    ///
    /// A lifetime of zero or less leaves the token expired as of `issued_at`.
    /// We'd rather refresh again on the next call than guess a lifetime.
    /// Returns `None` if the lifetime reaches past what an `Instant` can represent.
    pub fn issued(response: TokenResponse, issued_at: Instant) -> Option<Self> {
        let lifetime = u64::try_from(response.expires_in).unwrap_or(0);
        let expires_at = issued_at.checked_add(Duration::from_secs(lifetime))?;
        Some(Self {
            value: response.access_token,
            expires_at,
        })
    }

    /// Whether this token should no longer be presented.
    /// A token expiring exactly now is considered expired.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}
