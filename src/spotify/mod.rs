//! # Spotify Integration Module
//!
//! This module is the integration layer between swipecli and the Spotify Web
//! API: OAuth 2.0 PKCE authentication with token lifecycle management, and a
//! thin typed catalog client for the read endpoints the recommendation
//! engine draws from.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, Management)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE + client-credentials fallback)
//!     └── Catalog (search, top items, artist lookup, playlists)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication Strategy
//!
//! [`auth::AuthManager`] implements the OAuth 2.0 PKCE flow so no client
//! secret is required for user login:
//!
//! 1. **Code Verifier Generation**: 32 cryptographically random bytes,
//!    base64url-encoded without padding
//! 2. **Challenge Creation**: base64url SHA-256 digest of the verifier (S256)
//! 3. **Authorization Request**: the user grants access in the browser
//! 4. **Callback Handling**: the redirect carries the authorization code
//! 5. **Token Exchange**: code + verifier become an access/refresh pair
//! 6. **Token Lifecycle**: expired tokens are refreshed in place; when no
//!    user session exists, an app-level client-credentials token keeps
//!    public read endpoints usable
//!
//! ## Catalog Client
//!
//! [`catalog::SpotifyCatalog`] implements the [`Catalog`] trait: every call
//! obtains an active token from the authenticator first, fails with a typed
//! error on non-2xx statuses or undecodable bodies, and performs no retries.
//! The recommendation engine is generic over [`Catalog`] so tests can run it
//! against an in-memory fake.
//!
//! ## API Coverage
//!
//! - `GET /search` - free-text and field-qualified track search
//! - `GET /me/top/artists`, `GET /me/top/tracks` - personalization seeds
//! - `GET /artists/{id}` - artist name and genre tags (cached per id)
//! - `GET /me` - profile display name after login
//! - `POST /token` - authorization_code, refresh_token, client_credentials
//! - `POST /me/playlists`, `POST /playlists/{id}/tracks` - liked-track export

use std::fmt;

use crate::{error::ApiError, types::Track};

pub mod auth;
pub mod catalog;

/// Time window for the top-items personalization endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Short,
    #[default]
    Medium,
    Long,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::Short => "short_term",
            TimeRange::Medium => "medium_term",
            TimeRange::Long => "long_term",
        };
        write!(f, "{}", s)
    }
}

/// Read access to the remote music catalog.
///
/// The seam between the recommendation engine and the Spotify Web API:
/// production code uses [`catalog::SpotifyCatalog`], tests substitute an
/// in-memory fake. Implementations are expected to be cheap to call
/// concurrently; the engine fans its strategies out in parallel.
#[allow(async_fn_in_trait)]
pub trait Catalog: Send + Sync {
    /// Searches for tracks. Supports Spotify's field qualifiers
    /// (`artist:`, `genre:"..."`, `year:lo-hi`) inside `query`.
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, ApiError>;

    /// Returns the ids of the user's top artists. Requires a user session.
    async fn top_artists(&self, limit: u32, time_range: TimeRange)
    -> Result<Vec<String>, ApiError>;

    /// Returns the user's top tracks. Requires a user session.
    async fn top_tracks(&self, limit: u32, time_range: TimeRange)
    -> Result<Vec<Track>, ApiError>;

    /// Display name of one artist. Cached per id for the process lifetime.
    async fn artist_name(&self, artist_id: &str) -> Result<String, ApiError>;

    /// Genre tags of one artist. Cached per id for the process lifetime.
    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, ApiError>;
}
