//! Spotify Web API track models.

use serde::{Deserialize, Serialize};

/// Album or track image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Artist as embedded in a track.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Album as embedded in a track.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

/// Track object from `/tracks/{id}` and `/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    #[serde(default)]
    pub album: Option<RawAlbum>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub uri: String,
}

/// Paging object wrapping tracks in a search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrackPage {
    #[serde(default)]
    pub items: Vec<RawTrack>,
    #[serde(default)]
    pub total: u64,
}

/// `/search?type=track` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub tracks: RawTrackPage,
}

/// A track as served to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub uri: String,
    /// Largest album image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let (album, image_url) = match raw.album {
            Some(album) => {
                let image = album
                    .images
                    .into_iter()
                    .max_by_key(|img| img.width.unwrap_or(0))
                    .map(|img| img.url);
                (Some(album.name), image)
            }
            None => (None, None),
        };

        Self {
            id: raw.id,
            name: raw.name,
            artists: raw.artists.into_iter().map(|a| a.name).collect(),
            album,
            duration_ms: raw.duration_ms,
            preview_url: raw.preview_url,
            uri: raw.uri,
            image_url,
        }
    }
}

/// Search results as served to the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackList {
    pub tracks: Vec<Track>,
    pub total: u64,
}

impl From<RawSearchResponse> for TrackList {
    fn from(raw: RawSearchResponse) -> Self {
        Self {
            total: raw.tracks.total,
            tracks: raw.tracks.items.into_iter().map(Track::from).collect(),
        }
    }
}
