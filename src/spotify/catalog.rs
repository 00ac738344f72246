use std::{collections::HashMap, sync::Arc, sync::Mutex, time::Duration};

use reqwest::Client;

use crate::{
    error::ApiError,
    management::TokenStore,
    spotify::{Catalog, TimeRange, auth::AuthManager},
    types::{
        AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, CreatePlaylistResponse,
        FullArtist, SearchResponse, TopArtistsResponse, TopTracksResponse, Track,
    },
};

/// Thin typed wrapper over the Spotify Web API read endpoints.
///
/// Stateless beyond a per-artist lookup cache; every call asks the
/// authenticator for an active token first. No retries: callers are expected
/// to tolerate partial failure, which the recommendation engine does by
/// swallowing individual strategy errors.
pub struct SpotifyCatalog<S: TokenStore> {
    auth: Arc<AuthManager<S>>,
    http: Client,
    api_url: String,
    artist_cache: Mutex<HashMap<String, FullArtist>>,
}

impl<S: TokenStore> SpotifyCatalog<S> {
    pub fn new(auth: Arc<AuthManager<S>>, api_url: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to construct HTTP client");

        SpotifyCatalog {
            auth,
            http,
            api_url,
            artist_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let token = self.auth.active_token().await?;
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestFailed(status.as_u16()));
        }

        response.json::<T>().await.map_err(|_| ApiError::InvalidResponse)
    }

    /// Full artist object, cached per id for the process lifetime. The cache
    /// lock is never held across the network call, so concurrently
    /// completing strategies stay safe.
    async fn artist(&self, artist_id: &str) -> Result<FullArtist, ApiError> {
        if let Some(cached) = self.artist_cache.lock().unwrap().get(artist_id) {
            return Ok(cached.clone());
        }

        let artist: FullArtist = self
            .get_json(&format!("/artists/{}", artist_id), &[])
            .await?;

        self.artist_cache
            .lock()
            .unwrap()
            .insert(artist_id.to_string(), artist.clone());
        Ok(artist)
    }

    /// Creates a private playlist owned by the logged-in user.
    pub async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResponse, ApiError> {
        let token = self.auth.active_token().await?;
        let url = format!("{}/me/playlists", self.api_url);

        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: false,
            collaborative: false,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestFailed(status.as_u16()));
        }

        response
            .json::<CreatePlaylistResponse>()
            .await
            .map_err(|_| ApiError::InvalidResponse)
    }

    /// Adds tracks to a playlist by Spotify URI.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        tracks: &[Track],
    ) -> Result<AddTracksResponse, ApiError> {
        let token = self.auth.active_token().await?;
        let url = format!("{}/playlists/{}/tracks", self.api_url, playlist_id);

        let body = AddTracksRequest {
            uris: tracks.iter().map(|t| t.uri()).collect(),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestFailed(status.as_u16()));
        }

        response
            .json::<AddTracksResponse>()
            .await
            .map_err(|_| ApiError::InvalidResponse)
    }
}

impl<S: TokenStore> Catalog for SpotifyCatalog<S> {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, ApiError> {
        let response: SearchResponse = self
            .get_json(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", "track".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(response.tracks.items)
    }

    async fn top_artists(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<String>, ApiError> {
        let response: TopArtistsResponse = self
            .get_json(
                "/me/top/artists",
                &[
                    ("limit", limit.to_string()),
                    ("time_range", time_range.to_string()),
                ],
            )
            .await?;

        Ok(response.items.into_iter().map(|a| a.id).collect())
    }

    async fn top_tracks(&self, limit: u32, time_range: TimeRange) -> Result<Vec<Track>, ApiError> {
        let response: TopTracksResponse = self
            .get_json(
                "/me/top/tracks",
                &[
                    ("limit", limit.to_string()),
                    ("time_range", time_range.to_string()),
                ],
            )
            .await?;

        Ok(response.items)
    }

    async fn artist_name(&self, artist_id: &str) -> Result<String, ApiError> {
        Ok(self.artist(artist_id).await?.name)
    }

    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.artist(artist_id).await?.genres)
    }
}
