//! App-level access token for the Spotify Web API.
//!
//! The client-credentials token is cached until 60 seconds before it
//! expires. Concurrent callers that find the cache empty share a single
//! in-flight fetch (`moka`'s `try_get_with` coalesces initializers).

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;

use super::token::TokenClient;
use crate::config::{OAuthCredentials, ProviderEndpoints};
use crate::error::{ClientError, ClientResult};
use crate::oauth::provider::Provider;

/// Tokens are refreshed this long before they expire.
pub const EXPIRY_SKEW: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct AppToken {
    access_token: String,
    ttl: Duration,
}

struct AppTokenExpiry;

impl Expiry<(), AppToken> for AppTokenExpiry {
    fn expire_after_create(
        &self,
        _key: &(),
        value: &AppToken,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Owned cache for the client-credentials token.
pub struct AppTokenCache {
    provider: Provider,
    tokens: TokenClient,
    credentials: OAuthCredentials,
    endpoints: ProviderEndpoints,
    cache: Cache<(), AppToken>,
}

impl AppTokenCache {
    #[must_use]
    pub fn new(
        provider: Provider,
        tokens: TokenClient,
        credentials: OAuthCredentials,
        endpoints: ProviderEndpoints,
    ) -> Self {
        let cache = Cache::builder().max_capacity(1).expire_after(AppTokenExpiry).build();
        Self { provider, tokens, credentials, endpoints, cache }
    }

    /// Return the cached token, fetching a new one when it is missing or
    /// about to expire. Failed fetches are not cached.
    pub async fn get_or_refresh(&self) -> ClientResult<String> {
        if !self.credentials.is_configured() {
            return Err(ClientError::NotConfigured(self.provider.display_name()));
        }

        self.cache
            .try_get_with((), self.fetch())
            .await
            .map(|token| token.access_token)
            .map_err(|shared| unshare(self.provider, shared))
    }

    /// Drop the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }

    async fn fetch(&self) -> ClientResult<AppToken> {
        let response = self
            .tokens
            .client_credentials(self.provider, &self.credentials, &self.endpoints)
            .await?;
        let expires_in = response.lifetime_secs();
        let lifetime = Duration::from_secs(u64::try_from(expires_in).unwrap_or(0));
        tracing::info!(provider = %self.provider, expires_in, "Fetched app access token");

        Ok(AppToken {
            access_token: response.access_token,
            ttl: lifetime.saturating_sub(EXPIRY_SKEW),
        })
    }
}

/// Every caller waiting on a failed fetch receives the same `Arc`; the
/// last one gets the original error, the others an equivalent copy.
fn unshare(provider: Provider, shared: Arc<ClientError>) -> ClientError {
    Arc::try_unwrap(shared).unwrap_or_else(|shared| match shared.as_ref() {
        ClientError::Upstream { context, status, message } => {
            ClientError::upstream(*context, *status, message.clone())
        }
        ClientError::NotConfigured(name) => ClientError::NotConfigured(*name),
        ClientError::MissingSession(name) => ClientError::MissingSession(*name),
        other => ClientError::upstream(
            "client credentials grant",
            502,
            format!("{} app token fetch failed: {other}", provider.display_name()),
        ),
    })
}

impl std::fmt::Debug for AppTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppTokenCache")
            .field("provider", &self.provider)
            .field("cached", &self.cache.contains_key(&()))
            .finish()
    }
}
