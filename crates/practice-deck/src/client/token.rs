//! Token endpoint calls: code exchange, refresh, client credentials.

use reqwest::Client;
use serde::Deserialize;

use super::read_json;
use crate::config::{OAuthCredentials, ProviderEndpoints};
use crate::error::{ClientError, ClientResult};
use crate::oauth::provider::{ClientAuth, Provider};

const fn default_expires_in() -> i64 {
    3600
}

/// Longest token lifetime taken at face value (one year).
pub const MAX_EXPIRES_IN: i64 = 365 * 24 * 3600;

/// Successful token endpoint response.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// `expires_in` clamped to `0..=MAX_EXPIRES_IN`.
    #[must_use]
    pub const fn lifetime_secs(&self) -> i64 {
        if self.expires_in < 0 {
            0
        } else if self.expires_in > MAX_EXPIRES_IN {
            MAX_EXPIRES_IN
        } else {
            self.expires_in
        }
    }

    /// Expiry in epoch milliseconds, counted from `now_ms`.
    #[must_use]
    pub const fn expires_at_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_add(self.lifetime_secs() * 1000)
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Client for provider token endpoints.
#[derive(Clone)]
pub struct TokenClient {
    http: Client,
}

impl TokenClient {
    #[must_use]
    pub const fn new(http: Client) -> Self {
        Self { http }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// `redirect_uri` must be the one sent to the consent screen.
    pub async fn exchange_code(
        &self,
        provider: Provider,
        credentials: &OAuthCredentials,
        endpoints: &ProviderEndpoints,
        code: &str,
        redirect_uri: &str,
    ) -> ClientResult<TokenResponse> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        self.request(provider, credentials, endpoints, "token exchange", &form).await
    }

    /// Trade a refresh token for a new access token.
    pub async fn refresh(
        &self,
        provider: Provider,
        credentials: &OAuthCredentials,
        endpoints: &ProviderEndpoints,
        refresh_token: &str,
    ) -> ClientResult<TokenResponse> {
        let form = [("grant_type", "refresh_token"), ("refresh_token", refresh_token)];
        self.request(provider, credentials, endpoints, "token refresh", &form).await
    }

    /// Fetch an app-level token with the client-credentials grant.
    pub async fn client_credentials(
        &self,
        provider: Provider,
        credentials: &OAuthCredentials,
        endpoints: &ProviderEndpoints,
    ) -> ClientResult<TokenResponse> {
        let form = [("grant_type", "client_credentials")];
        self.request(provider, credentials, endpoints, "client credentials grant", &form).await
    }

    async fn request(
        &self,
        provider: Provider,
        credentials: &OAuthCredentials,
        endpoints: &ProviderEndpoints,
        context: &'static str,
        form: &[(&str, &str)],
    ) -> ClientResult<TokenResponse> {
        let (Some(client_id), Some(client_secret)) =
            (credentials.client_id.as_deref(), credentials.client_secret.as_deref())
        else {
            return Err(ClientError::NotConfigured(provider.display_name()));
        };

        let mut params: Vec<(&str, &str)> = form.to_vec();
        let request = self.http.post(&endpoints.token_url);
        let request = match provider.descriptor().client_auth {
            ClientAuth::RequestBody => {
                params.push(("client_id", client_id));
                params.push(("client_secret", client_secret));
                request
            }
            ClientAuth::BasicHeader => request.basic_auth(client_id, Some(client_secret)),
        };

        tracing::debug!(provider = %provider, context, "Calling token endpoint");
        let response = request.form(&params).send().await?;
        read_json(context, response).await
    }
}

impl std::fmt::Debug for TokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenClient").finish()
    }
}
