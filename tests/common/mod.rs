// Not every test binary uses every helper here.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::Notify;

use swipecli::error::ApiError;
use swipecli::spotify::{Catalog, TimeRange};
use swipecli::types::{AlbumRef, ArtistRef, Track};

// Helper function to create a test track
pub fn make_track(id: &str, name: &str, artist: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![ArtistRef {
            id: format!("{}_artist_id", id),
            name: artist.to_string(),
        }],
        album: AlbumRef {
            id: format!("{}_album_id", id),
            name: "Test Album".to_string(),
            images: Vec::new(),
        },
        duration_ms: Some(180_000),
        preview_url: None,
        external_urls: None,
    }
}

/// Scripted catalog settings. Built once, then frozen inside the fake.
#[derive(Default)]
pub struct FakeSettings {
    /// When set, every search returns this list (truncated to the limit)
    /// instead of synthesizing tracks from the query text.
    pub canned_search: Option<Vec<Track>>,
    /// Every search fails with a 500.
    pub fail_search: bool,
    /// The user-scoped endpoints (top artists/tracks) fail with a 401,
    /// simulating a missing login.
    pub fail_user: bool,
    pub top_artist_ids: Vec<String>,
    pub top_tracks: Vec<Track>,
    /// artist id -> (name, genres)
    pub artists: HashMap<String, (String, Vec<String>)>,
    /// When set, every search blocks until the gate is notified. Lets tests
    /// hold a refill in flight deliberately.
    pub gate: Option<Arc<Notify>>,
}

/// In-memory stand-in for the Spotify catalog. Records every search query
/// so tests can assert on what the engine actually asked for.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    settings: Arc<FakeSettings>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeCatalog {
    pub fn new(settings: FakeSettings) -> Self {
        FakeCatalog {
            settings: Arc::new(settings),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A fake with plausible personalization seeds and synthetic search
    /// results.
    pub fn seeded() -> Self {
        let mut artists = HashMap::new();
        artists.insert(
            "a1".to_string(),
            ("Artist One".to_string(), vec!["indie rock".to_string()]),
        );
        artists.insert(
            "a2".to_string(),
            ("Artist Two".to_string(), vec!["dream pop".to_string()]),
        );

        FakeCatalog::new(FakeSettings {
            top_artist_ids: vec!["a1".to_string(), "a2".to_string()],
            top_tracks: vec![
                make_track("t1", "Midnight Dreams", "Artist One"),
                make_track("t2", "Midnight Rain", "Artist Two"),
                make_track("t3", "Golden Hour", "Artist Three"),
            ],
            artists,
            ..FakeSettings::default()
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Catalog for FakeCatalog {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, ApiError> {
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(gate) = &self.settings.gate {
            gate.notified().await;
        }

        if self.settings.fail_search {
            return Err(ApiError::RequestFailed(500));
        }

        if let Some(canned) = &self.settings.canned_search {
            let mut tracks = canned.clone();
            tracks.truncate(limit as usize);
            return Ok(tracks);
        }

        // Synthetic results: ids derive from the query, so distinct queries
        // yield distinct tracks and repeated queries yield the same ones.
        Ok((0..limit.min(5))
            .map(|i| {
                make_track(
                    &format!("{}#{}", query, i),
                    &format!("Result {}", i),
                    "Synth Artist",
                )
            })
            .collect())
    }

    async fn top_artists(
        &self,
        limit: u32,
        _time_range: TimeRange,
    ) -> Result<Vec<String>, ApiError> {
        if self.settings.fail_user {
            return Err(ApiError::RequestFailed(401));
        }
        Ok(self
            .settings
            .top_artist_ids
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn top_tracks(&self, limit: u32, _time_range: TimeRange) -> Result<Vec<Track>, ApiError> {
        if self.settings.fail_user {
            return Err(ApiError::RequestFailed(401));
        }
        Ok(self
            .settings
            .top_tracks
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn artist_name(&self, artist_id: &str) -> Result<String, ApiError> {
        self.settings
            .artists
            .get(artist_id)
            .map(|(name, _)| name.clone())
            .ok_or(ApiError::RequestFailed(404))
    }

    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, ApiError> {
        self.settings
            .artists
            .get(artist_id)
            .map(|(_, genres)| genres.clone())
            .ok_or(ApiError::RequestFailed(404))
    }
}
