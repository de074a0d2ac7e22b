//! YouTube Data API playlist models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThumbnail {
    pub url: String,
}

/// Thumbnail set; not every size is always present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThumbnails {
    #[serde(default)]
    pub default: Option<RawThumbnail>,
    #[serde(default)]
    pub medium: Option<RawThumbnail>,
    #[serde(default)]
    pub high: Option<RawThumbnail>,
}

impl RawThumbnails {
    /// Best available thumbnail, medium first.
    fn best(self) -> Option<String> {
        self.medium.or(self.high).or(self.default).map(|t| t.url)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaylistSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: RawThumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaylistDetails {
    #[serde(default)]
    pub item_count: u32,
}

/// Playlist resource from `/playlists`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaylist {
    pub id: String,
    #[serde(default)]
    pub snippet: RawPlaylistSnippet,
    #[serde(default)]
    pub content_details: RawPlaylistDetails,
}

/// `/playlists` list response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaylistsResponse {
    #[serde(default)]
    pub items: Vec<RawPlaylist>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResourceId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaylistItemSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub video_owner_channel_title: Option<String>,
    #[serde(default)]
    pub thumbnails: RawThumbnails,
    #[serde(default)]
    pub resource_id: RawResourceId,
}

/// Playlist item resource from `/playlistItems`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaylistItem {
    #[serde(default)]
    pub snippet: RawPlaylistItemSnippet,
}

/// `/playlistItems` list response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<RawPlaylistItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A playlist as served to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub item_count: u32,
}

impl From<RawPlaylist> for Playlist {
    fn from(raw: RawPlaylist) -> Self {
        Self {
            id: raw.id,
            title: raw.snippet.title,
            description: raw.snippet.description,
            thumbnail_url: raw.snippet.thumbnails.best(),
            item_count: raw.content_details.item_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistList {
    pub playlists: Vec<Playlist>,
}

/// A playlist entry as served to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistVideo {
    pub video_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub position: u32,
}

impl PlaylistVideo {
    /// Items without a video id (deleted or private videos) are dropped.
    fn from_raw(raw: RawPlaylistItem) -> Option<Self> {
        let snippet = raw.snippet;
        let video_id = snippet.resource_id.video_id.filter(|id| !id.is_empty())?;
        Some(Self {
            video_id,
            title: snippet.title,
            channel_title: snippet.video_owner_channel_title,
            thumbnail_url: snippet.thumbnails.best(),
            position: snippet.position,
        })
    }
}

/// One page of a playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItemsPage {
    pub items: Vec<PlaylistVideo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl From<RawPlaylistItemsResponse> for PlaylistItemsPage {
    fn from(raw: RawPlaylistItemsResponse) -> Self {
        Self {
            items: raw.items.into_iter().filter_map(PlaylistVideo::from_raw).collect(),
            next_page_token: raw.next_page_token,
        }
    }
}
