//! Media endpoints backed by the provider APIs.
//!
//! Spotify lookups use the app token; YouTube playlist calls use the
//! signed-in user's session and may refresh it.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::AppState;
use crate::client::spotify::MAX_SEARCH_LIMIT;
use crate::error::{ApiError, ApiResult, ClientResult};
use crate::models::{PlaylistItemsPage, PlaylistList, Track, TrackList};
use crate::oauth::Provider;
use crate::oauth::session::ensure_access_token;

const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Provider ids are opaque tokens; anything else would change the upstream path.
fn validate_id(field: &'static str, id: &str) -> ApiResult<()> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(()) } else { Err(ApiError::validation(field, "must be a non-empty id")) }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /api/spotify/search?q=<text>[&limit=<1..50>]`
pub async fn handle_spotify_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<TrackList>> {
    let text = query.q.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::validation("q", "cannot be empty"));
    }

    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
        let message = format!("must be between 1 and {MAX_SEARCH_LIMIT}");
        return Err(ApiError::validation("limit", message));
    }

    Ok(Json(state.spotify.search_tracks(text, limit).await?))
}

/// `GET /api/spotify/tracks/{track_id}`
pub async fn handle_spotify_track(
    State(state): State<Arc<AppState>>,
    Path(track_id): Path<String>,
) -> ApiResult<Json<Track>> {
    validate_id("track_id", &track_id)?;
    Ok(Json(state.spotify.get_track(&track_id).await?))
}

/// Result of a handler that may have refreshed the session: the jar is
/// returned on both paths so refreshed cookies are never dropped.
pub type SessionResult<T> = Result<(CookieJar, Json<T>), (CookieJar, ApiError)>;

/// Refresh the YouTube session if needed, then run `call` with the access token.
async fn with_youtube_session<T, F, Fut>(
    state: &AppState,
    jar: CookieJar,
    call: F,
) -> SessionResult<T>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let (jar, access_token) = ensure_access_token(state, Provider::YouTube, jar)
        .await
        .map_err(|e| (CookieJar::new(), e))?;
    match call(access_token).await {
        Ok(value) => Ok((jar, Json(value))),
        Err(e) => Err((jar, e.into())),
    }
}

/// `GET /api/youtube/playlists`
pub async fn handle_youtube_playlists(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> SessionResult<PlaylistList> {
    let youtube = &state.youtube;
    with_youtube_session(&state, jar, |token| async move { youtube.list_playlists(&token).await })
        .await
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page_token: Option<String>,
}

/// `GET /api/youtube/playlists/{playlist_id}/items[?page_token=]`
pub async fn handle_youtube_playlist_items(
    State(state): State<Arc<AppState>>,
    Path(playlist_id): Path<String>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> SessionResult<PlaylistItemsPage> {
    if let Err(e) = validate_id("playlist_id", &playlist_id) {
        return Err((jar, e));
    }
    let youtube = &state.youtube;
    let page_token = query.page_token.filter(|t| !t.is_empty());
    with_youtube_session(&state, jar, |token| async move {
        youtube.playlist_items(&token, &playlist_id, page_token.as_deref()).await
    })
    .await
}
