//! Configuration for the practice-deck server.

use std::time::Duration;

/// Provider endpoint constants.
pub mod api {
    use std::time::Duration;

    /// Google OAuth consent screen.
    pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Google OAuth token endpoint.
    pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

    /// YouTube Data API v3.
    pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

    /// Spotify consent screen.
    pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";

    /// Spotify token endpoint.
    pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

    /// Spotify Web API.
    pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

    /// Request timeout for provider calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// API response cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cached API responses.
    pub const CACHE_MAX_SIZE: u64 = 500;
}

/// Deployment environment, taken from `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Only the exact value `production` selects production.
    #[must_use]
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            _ => Self::Development,
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Client credentials for one OAuth provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Explicit callback URL; derived from the request when absent.
    pub redirect_uri: Option<String>,
}

impl OAuthCredentials {
    /// Build credentials, treating empty strings as absent.
    #[must_use]
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> Self {
        Self {
            client_id: non_empty(client_id),
            client_secret: non_empty(client_secret),
            redirect_uri: non_empty(redirect_uri),
        }
    }

    /// True iff both the client id and the client secret are present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("has_client_secret", &self.client_secret.is_some())
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Where a provider lives. Overridden in tests to point at mock servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl ProviderEndpoints {
    #[must_use]
    pub fn youtube() -> Self {
        Self {
            authorize_url: api::GOOGLE_AUTHORIZE_URL.to_string(),
            token_url: api::GOOGLE_TOKEN_URL.to_string(),
            api_url: api::YOUTUBE_API_URL.to_string(),
        }
    }

    #[must_use]
    pub fn spotify() -> Self {
        Self {
            authorize_url: api::SPOTIFY_AUTHORIZE_URL.to_string(),
            token_url: api::SPOTIFY_TOKEN_URL.to_string(),
            api_url: api::SPOTIFY_API_URL.to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// YouTube (Google) OAuth client.
    pub youtube: OAuthCredentials,

    /// Spotify OAuth client.
    pub spotify: OAuthCredentials,

    /// Controls the `Secure` cookie attribute.
    pub environment: Environment,

    /// Google / YouTube endpoints.
    pub youtube_endpoints: ProviderEndpoints,

    /// Spotify endpoints.
    pub spotify_endpoints: ProviderEndpoints,

    /// Request timeout for provider calls.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// API response cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cached API responses.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a configuration with the real provider endpoints.
    #[must_use]
    pub fn new(
        youtube: OAuthCredentials,
        spotify: OAuthCredentials,
        environment: Environment,
    ) -> Self {
        Self {
            youtube,
            spotify,
            environment,
            youtube_endpoints: ProviderEndpoints::youtube(),
            spotify_endpoints: ProviderEndpoints::spotify(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration with both providers configured and every
    /// token/API endpoint pointing at `base_url`.
    ///
    /// Authorize URLs keep their real values since they are only ever
    /// rendered into redirects.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            youtube: OAuthCredentials::new(
                Some("yt-client-id".to_string()),
                Some("yt-client-secret".to_string()),
                None,
            ),
            spotify: OAuthCredentials::new(
                Some("spotify-client-id".to_string()),
                Some("spotify-client-secret".to_string()),
                None,
            ),
            environment: Environment::Development,
            youtube_endpoints: ProviderEndpoints {
                authorize_url: api::GOOGLE_AUTHORIZE_URL.to_string(),
                token_url: format!("{}/google/token", base_url),
                api_url: format!("{}/youtube/v3", base_url),
            },
            spotify_endpoints: ProviderEndpoints {
                authorize_url: api::SPOTIFY_AUTHORIZE_URL.to_string(),
                token_url: format!("{}/spotify/token", base_url),
                api_url: format!("{}/spotify/v1", base_url),
            },
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// YouTube variables fall back to their `GOOGLE_*` names.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let youtube = OAuthCredentials::new(
            env_with_fallback("YOUTUBE_CLIENT_ID", "GOOGLE_CLIENT_ID"),
            env_with_fallback("YOUTUBE_CLIENT_SECRET", "GOOGLE_CLIENT_SECRET"),
            env_with_fallback("YOUTUBE_REDIRECT_URI", "GOOGLE_REDIRECT_URI"),
        );
        let spotify = OAuthCredentials::new(
            std::env::var("SPOTIFY_CLIENT_ID").ok(),
            std::env::var("SPOTIFY_CLIENT_SECRET").ok(),
            std::env::var("SPOTIFY_REDIRECT_URI").ok(),
        );
        let node_env = std::env::var("NODE_ENV").ok();

        for uri in [&youtube.redirect_uri, &spotify.redirect_uri].into_iter().flatten() {
            url::Url::parse(uri)
                .map_err(|e| anyhow::anyhow!("invalid redirect URI override {uri:?}: {e}"))?;
        }

        Ok(Self::new(youtube, spotify, Environment::from_node_env(node_env.as_deref())))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(OAuthCredentials::default(), OAuthCredentials::default(), Environment::default())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    non_empty(std::env::var(primary).ok()).or_else(|| non_empty(std::env::var(fallback).ok()))
}
