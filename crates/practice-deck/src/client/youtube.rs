//! YouTube Data API client (user access).
//!
//! Every call takes the signed-in user's access token; session handling
//! lives in [`crate::oauth::session`].

use std::collections::HashSet;

use reqwest::Client;

use super::read_json;
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{
    PlaylistItemsPage, PlaylistList, Playlist, RawPlaylistItemsResponse, RawPlaylistsResponse,
};

/// Page size for list calls (API maximum).
const MAX_RESULTS: &str = "50";

/// Most playlist pages fetched for one listing.
pub const MAX_PLAYLIST_PAGES: usize = 20;

/// YouTube Data API client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    api_url: String,
}

impl YouTubeClient {
    #[must_use]
    pub fn new(http: Client, config: &Config) -> Self {
        Self { http, api_url: config.youtube_endpoints.api_url.clone() }
    }

    /// All playlists owned by the signed-in user, following page tokens.
    ///
    /// Stops after [`MAX_PLAYLIST_PAGES`] pages or when a page token repeats.
    pub async fn list_playlists(&self, access_token: &str) -> ClientResult<PlaylistList> {
        let url = format!("{}/playlists", self.api_url);
        let mut playlists = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        for page_number in 1..=MAX_PLAYLIST_PAGES {
            let mut params = vec![
                ("part", "snippet,contentDetails"),
                ("mine", "true"),
                ("maxResults", MAX_RESULTS),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response =
                self.http.get(&url).query(&params).bearer_auth(access_token).send().await?;
            let page: RawPlaylistsResponse = read_json("YouTube playlists", response).await?;
            playlists.extend(page.items.into_iter().map(Playlist::from));

            let Some(next) = page.next_page_token.filter(|t| !t.is_empty()) else {
                break;
            };
            if !seen_tokens.insert(next.clone()) {
                tracing::warn!(page_token = %next, "YouTube repeated a playlist page token");
                break;
            }
            if page_number == MAX_PLAYLIST_PAGES {
                tracing::warn!(pages = MAX_PLAYLIST_PAGES, "Playlist listing truncated");
            }
            page_token = Some(next);
        }

        tracing::debug!(count = playlists.len(), "Fetched YouTube playlists");
        Ok(PlaylistList { playlists })
    }

    /// One page of videos in a playlist.
    pub async fn playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> ClientResult<PlaylistItemsPage> {
        let url = format!("{}/playlistItems", self.api_url);
        let mut params = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", MAX_RESULTS),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self.http.get(&url).query(&params).bearer_auth(access_token).send().await?;
        let raw: RawPlaylistItemsResponse = read_json("YouTube playlist items", response).await?;
        Ok(PlaylistItemsPage::from(raw))
    }
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient").field("api_url", &self.api_url).finish()
    }
}
