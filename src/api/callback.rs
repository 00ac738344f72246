use std::sync::Arc;

use axum::{Extension, extract::RawQuery, response::Html};

use crate::{
    error::AuthError,
    management::FileTokenStore,
    spotify::auth::AuthManager,
    warning,
};

/// Handles the OAuth redirect from Spotify's authorization server.
///
/// The raw query string is reattached to the configured redirect URI so the
/// authenticator sees the exact URL the browser was sent to, then the PKCE
/// exchange runs. The response body only tells the user whether to close the
/// browser window; the CLI observes the outcome through the authenticator.
pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(auth): Extension<Arc<AuthManager<FileTokenStore>>>,
) -> Html<&'static str> {
    let redirect_uri = auth.redirect_uri();
    let url = match query {
        Some(query) => format!("{}?{}", redirect_uri, query),
        None => redirect_uri.to_string(),
    };

    match auth.handle_callback(&url).await {
        Ok(()) => Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
        Err(AuthError::AuthorizationDenied(reason)) => {
            warning!("Authorization denied: {}", reason);
            Html("<h4>Authorization was denied.</h4>")
        }
        Err(AuthError::MalformedCallback) => Html("<h4>Missing authorization code.</h4>"),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
