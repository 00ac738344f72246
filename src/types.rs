use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Default year range applied when the user has not narrowed the filter.
pub const DEFAULT_YEAR_RANGE: (u16, u16) = (2020, 2024);

/// A stored access/refresh token pair with an absolute expiry instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds). The token is usable only while `now < expires_at`.
    pub expires_at: i64,
}

impl TokenRecord {
    /// A token whose expiry equals the current instant counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Wire shape of the token endpoint response, for all three grant types.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Converts the relative `expires_in` into an absolute record, carrying
    /// over `previous_refresh` when the provider did not rotate the token.
    pub fn into_record(self, previous_refresh: Option<String>) -> TokenRecord {
        TokenRecord {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + self.expires_in,
        }
    }
}

/// A playable candidate track, immutable once decoded from a provider
/// response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

impl Track {
    pub fn primary_artist(&self) -> &str {
        self.artists
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown Artist")
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.album.images.first().map(|i| i.url.as_str())
    }

    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls
            .as_ref()
            .and_then(|u| u.spotify.as_deref())
    }

    /// Spotify URI form used when adding tracks to playlists.
    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// `GET /search?type=track` response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    pub items: Vec<Track>,
}

/// `GET /me/top/tracks` response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    pub items: Vec<Track>,
}

/// `GET /me/top/artists` response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct TopArtistsResponse {
    pub items: Vec<FullArtist>,
}

/// Full artist object as returned by top-items and artist lookup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// User-owned discovery filter: genre tags, an inclusive year range, and the
/// New/Classics/Popular quick toggles that gate query generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MusicFilter {
    pub selected_genres: Vec<String>,
    pub year_range: (u16, u16),
    pub include_new: bool,
    pub include_classics: bool,
    pub include_popular: bool,
}

impl Default for MusicFilter {
    fn default() -> Self {
        MusicFilter {
            selected_genres: Vec::new(),
            year_range: DEFAULT_YEAR_RANGE,
            include_new: false,
            include_classics: false,
            include_popular: false,
        }
    }
}

impl MusicFilter {
    /// Active iff the genre set is non-empty or the year range was moved off
    /// the default. The quick toggles alone do not activate direct-search
    /// mode; they only shape the generated queries.
    pub fn is_active(&self) -> bool {
        !self.selected_genres.is_empty() || self.year_range != DEFAULT_YEAR_RANGE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub track: String,
    pub artist: String,
    pub album: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        TrackTableRow {
            track: track.name.clone(),
            artist: track.primary_artist().to_string(),
            album: track.album.name.clone(),
        }
    }
}
