//! Data models for provider API entities.
//!
//! Raw provider payloads use `#[serde(default)]` for optional fields and are
//! converted into the flatter shapes the browser consumes.

mod spotify;
mod youtube;

pub use spotify::{
    RawAlbum, RawArtist, RawImage, RawSearchResponse, RawTrack, RawTrackPage, Track, TrackList,
};
pub use youtube::{
    Playlist, PlaylistItemsPage, PlaylistList, PlaylistVideo, RawPlaylist, RawPlaylistItem,
    RawPlaylistItemsResponse, RawPlaylistsResponse, RawThumbnail, RawThumbnails,
};
