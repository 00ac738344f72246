//! Configuration management for the music discovery client.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files, including the Spotify API
//! credentials and endpoints used by the authenticator and catalog client.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Credentials are never hard-coded: the client id (and the optional client
//! secret for the app-level fallback grant) always come from configuration.
//! Components receive an [`AuthConfig`] snapshot at construction time rather
//! than reading the environment ad hoc, which keeps them testable against
//! local stub endpoints.

use std::{env, path::PathBuf};

/// Everything the authenticator and catalog client need to talk to the
/// remote provider. Built once at startup via [`AuthConfig::from_env`] and
/// passed down explicitly.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    /// Only required for the app-level client-credentials fallback.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl AuthConfig {
    /// Builds a configuration snapshot from the environment.
    ///
    /// # Panics
    ///
    /// Panics if any of the required variables is unset; call
    /// [`load_env`] first so values from the `.env` file are visible.
    pub fn from_env() -> Self {
        AuthConfig {
            client_id: spotify_client_id(),
            client_secret: spotify_client_secret(),
            redirect_uri: spotify_redirect_uri(),
            scope: spotify_scope(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
        }
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `swipecli/.env`. A missing file is not an
/// error: variables may equally be provided by the process environment.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/swipecli/.env`
/// - macOS: `~/Library/Application Support/swipecli/.env`
/// - Windows: `%LOCALAPPDATA%/swipecli/.env`
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created.
pub async fn load_env() -> crate::Res<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("swipecli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    // The file is optional; plain environment variables still apply.
    let _ = dotenv::from_path(path);
    Ok(())
}

/// Returns the server address for the local OAuth callback server.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the optional Spotify API client secret.
///
/// The PKCE user flow works without a secret; it is only needed for the
/// app-level client-credentials grant that keeps public search endpoints
/// usable without a logged-in user. `None` disables that fallback.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Returns the Spotify OAuth redirect URI.
///
/// This must match the redirect URI registered in the Spotify application
/// settings.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the Spotify API scope permissions requested during login.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_SCOPE` environment variable is not set.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").expect("SPOTIFY_API_AUTH_SCOPE must be set")
}

/// Returns the Spotify OAuth authorization URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_URL` environment variable is not set.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL").expect("SPOTIFY_API_AUTH_URL must be set")
}

/// Returns the Spotify Web API base URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_URL` environment variable is not set.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").expect("SPOTIFY_API_URL must be set")
}

/// Returns the Spotify OAuth token exchange URL.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_TOKEN_URL` environment variable is not set.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").expect("SPOTIFY_API_TOKEN_URL must be set")
}
