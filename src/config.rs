use std::fmt;
use url::Url;

/// The management API all requests are made against, unless overridden.
pub const DEFAULT_API_URL: &str = "https://api.1nce.com/management-api";

/// Environment variable names we read at startup.
pub const CLIENT_ID_VAR: &str = "ONCE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "ONCE_CLIENT_SECRET";
pub const API_URL_VAR: &str = "ONCE_API_URL";

/// Possible issues while reading our configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("invalid API URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

/// The client ID and secret used for the client credentials grant.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Everything the server needs, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Base of the management API. Always ends with a `/` so that
    /// relative paths can be joined onto it.
    pub api_url: Url,
    /// The OAuth2 token endpoint, which lives underneath the API base.
    pub token_url: Url,
}

impl Config {
    /// Reads our configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads our configuration through the given lookup function.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let credentials = Credentials {
            client_id: required(CLIENT_ID_VAR)?,
            client_secret: required(CLIENT_SECRET_VAR)?,
        };

        let raw_url = lookup(API_URL_VAR)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_base_url(&raw_url)?;
        let token_url = api_url
            .join("oauth/token")
            .map_err(|source| ConfigError::InvalidUrl {
                url: raw_url.clone(),
                source,
            })?;

        Ok(Self {
            credentials,
            api_url,
            token_url,
        })
    }
}

/// Parses a base URL, ensuring a trailing slash so `Url::join` appends rather than replaces.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    // Something like `mailto:` parses fine, but can't have paths joined onto it.
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_reads_credentials_and_default_url() {
        let config = Config::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id"),
            (CLIENT_SECRET_VAR, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.client_id, "id");
        assert_eq!(config.credentials.client_secret, "secret");
        assert_eq!(
            config.api_url.as_str(),
            "https://api.1nce.com/management-api/"
        );
        assert_eq!(
            config.token_url.as_str(),
            "https://api.1nce.com/management-api/oauth/token"
        );
    }

    #[test]
    fn test_missing_client_id() {
        let err = Config::from_lookup(lookup_from(&[(CLIENT_SECRET_VAR, "secret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CLIENT_ID_VAR)));
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id"),
            (CLIENT_SECRET_VAR, ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CLIENT_SECRET_VAR)));
    }

    #[test]
    fn test_api_url_override() {
        let config = Config::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id"),
            (CLIENT_SECRET_VAR, "secret"),
            (API_URL_VAR, "http://127.0.0.1:9000"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(
            config.token_url.as_str(),
            "http://127.0.0.1:9000/oauth/token"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let err = Config::from_lookup(lookup_from(&[
            (CLIENT_ID_VAR, "id"),
            (CLIENT_SECRET_VAR, "secret"),
            (API_URL_VAR, "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
        };
        let printed = format!("{credentials:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
