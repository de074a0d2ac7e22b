//! Spotify Web API client (app-level access).
//!
//! Uses the client-credentials token from [`AppTokenCache`]. GET responses
//! are cached for the configured TTL.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::Client;

use super::{AppTokenCache, check_status};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{RawSearchResponse, RawTrack, Track, TrackList};

/// Largest `limit` the search endpoint accepts.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Spotify Web API client.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    app_tokens: Arc<AppTokenCache>,
    cache: Cache<String, serde_json::Value>,
}

impl SpotifyClient {
    #[must_use]
    pub fn new(http: Client, config: &Config, app_tokens: Arc<AppTokenCache>) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Self { http, api_url: config.spotify_endpoints.api_url.clone(), app_tokens, cache }
    }

    /// Search tracks by free text.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> ClientResult<TrackList> {
        let url = format!("{}/search", self.api_url);
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("type".to_string(), "track".to_string()),
            ("limit".to_string(), limit.clamp(1, MAX_SEARCH_LIMIT).to_string()),
        ];

        let raw: RawSearchResponse = self.get("Spotify search", &url, &params).await?;
        Ok(TrackList::from(raw))
    }

    /// Look up one track.
    pub async fn get_track(&self, track_id: &str) -> ClientResult<Track> {
        let url = format!("{}/tracks/{}", self.api_url, track_id);
        let raw: RawTrack = self.get("Spotify track lookup", &url, &[]).await?;
        Ok(Track::from(raw))
    }

    async fn get<T>(
        &self,
        context: &'static str,
        url: &str,
        params: &[(String, String)],
    ) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let cache_key = cache_key(url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return serde_json::from_value(cached)
                .map_err(|source| ClientError::InvalidResponse { context, source });
        }

        let token = self.app_tokens.get_or_refresh().await?;
        let response = self.http.get(url).query(params).bearer_auth(&token).send().await?;

        // A revoked app token is dropped so the next request starts fresh.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.app_tokens.invalidate().await;
        }

        let response = check_status(context, response).await?;
        let body = response.text().await?;
        let invalid = |source: serde_json::Error| {
            tracing::error!(context, error = %source, "Spotify returned an unexpected payload");
            ClientError::InvalidResponse { context, source }
        };
        let value: serde_json::Value = serde_json::from_str(&body).map_err(invalid)?;
        let decoded: T = serde_json::from_value(value.clone()).map_err(invalid)?;

        // Only payloads that decode are cached.
        self.cache.insert(cache_key, value).await;
        Ok(decoded)
    }
}

/// Generate cache key.
fn cache_key(url: &str, params: &[(String, String)]) -> String {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update(url.as_bytes());
    hasher.update(b"|");
    for (k, v) in params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }
    format!("{:x}", hasher.finalize())
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient").field("api_url", &self.api_url).finish()
    }
}
