//! Provider descriptors.
//!
//! Both providers run the same authorization-code flow; everything that
//! differs between them lives in a [`ProviderDescriptor`].

use crate::config::{Config, OAuthCredentials, ProviderEndpoints};

/// How client credentials are presented to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuth {
    /// `client_id` and `client_secret` in the form body (Google).
    RequestBody,
    /// HTTP Basic `Authorization` header (Spotify).
    BasicHeader,
}

/// Static description of one OAuth provider.
#[derive(Debug)]
pub struct ProviderDescriptor {
    /// Path segment under `/api/`.
    pub slug: &'static str,
    /// Name shown in error messages.
    pub display_name: &'static str,
    /// Prefix of every cookie this provider sets.
    pub cookie_prefix: &'static str,
    pub scopes: &'static [&'static str],
    /// Provider-specific authorization URL parameters.
    pub extra_auth_params: &'static [(&'static str, &'static str)],
    /// Where the user lands after login when nothing better is known.
    pub default_redirect: &'static str,
    /// Whether logout also answers `GET`.
    pub logout_via_get: bool,
    pub client_auth: ClientAuth,
}

static YOUTUBE: ProviderDescriptor = ProviderDescriptor {
    slug: "youtube",
    display_name: "YouTube",
    cookie_prefix: "yt",
    scopes: &[
        "https://www.googleapis.com/auth/youtube.readonly",
        "openid",
        "email",
    ],
    extra_auth_params: &[
        ("access_type", "offline"),
        ("prompt", "consent"),
        ("include_granted_scopes", "true"),
    ],
    default_redirect: "/youtube",
    logout_via_get: true,
    client_auth: ClientAuth::RequestBody,
};

static SPOTIFY: ProviderDescriptor = ProviderDescriptor {
    slug: "spotify",
    display_name: "Spotify",
    cookie_prefix: "spotify",
    scopes: &[
        "streaming",
        "user-read-email",
        "user-read-private",
        "user-read-playback-state",
        "user-modify-playback-state",
        "playlist-read-private",
    ],
    extra_auth_params: &[("show_dialog", "false")],
    default_redirect: "/spotify",
    logout_via_get: false,
    client_auth: ClientAuth::BasicHeader,
};

/// A supported OAuth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    YouTube,
    Spotify,
}

impl Provider {
    pub const ALL: [Self; 2] = [Self::YouTube, Self::Spotify];

    #[must_use]
    pub fn descriptor(self) -> &'static ProviderDescriptor {
        match self {
            Self::YouTube => &YOUTUBE,
            Self::Spotify => &SPOTIFY,
        }
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        self.descriptor().slug
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        self.descriptor().display_name
    }

    /// Credentials for this provider from the server configuration.
    #[must_use]
    pub fn credentials(self, config: &Config) -> &OAuthCredentials {
        match self {
            Self::YouTube => &config.youtube,
            Self::Spotify => &config.spotify,
        }
    }

    /// Endpoints for this provider from the server configuration.
    #[must_use]
    pub fn endpoints(self, config: &Config) -> &ProviderEndpoints {
        match self {
            Self::YouTube => &config.youtube_endpoints,
            Self::Spotify => &config.spotify_endpoints,
        }
    }

    /// `/api/<slug>/callback`, appended to the request base URL when no
    /// explicit redirect URI is configured.
    #[must_use]
    pub fn callback_path(self) -> String {
        format!("/api/{}/callback", self.slug())
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| format!("unknown provider '{s}'"))
    }
}
