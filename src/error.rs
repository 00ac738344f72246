//! Error types for the discovery client.
//!
//! Defines the authentication and API error taxonomy using thiserror so
//! failures propagate with enough structure for callers to decide between
//! re-login prompts, fallbacks, and user-visible messages.

use thiserror::Error;

/// Authentication and token lifecycle failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Neither a user session nor the app-level fallback produced a token.
    #[error("not authenticated with Spotify")]
    NotAuthenticated,

    /// The client configuration cannot produce a valid authorization URL.
    #[error("invalid client configuration: {0}")]
    ConfigurationError(String),

    /// The OAuth callback carried no authorization code.
    #[error("authorization callback is missing the code parameter")]
    MalformedCallback,

    /// The provider redirected back with an error parameter.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The code-for-token exchange returned a non-200 status.
    #[error("token exchange failed with status {0}")]
    ExchangeFailed(u16),

    /// The refresh-token grant returned a non-200 status.
    #[error("token refresh failed with status {0}")]
    RefreshFailed(u16),

    /// A refresh was required but no refresh token is held.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// Transport-level failure talking to the token endpoint.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Catalog request failures.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error("request failed with status {0}")]
    RequestFailed(u16),

    /// A 2xx response carried a body the client could not decode.
    #[error("invalid response from Spotify")]
    InvalidResponse,

    /// Every strategy and the generic fallback came back empty.
    #[error("failed to load recommendations")]
    NoRecommendations,

    /// Obtaining an access token failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport-level failure talking to the API.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
