use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    config, error,
    management::FileTokenStore,
    server::start_api_server,
    spotify::auth::AuthManager,
    success, warning,
};

/// Runs the complete OAuth 2.0 PKCE authentication flow.
///
/// 1. **PKCE Setup**: the authenticator generates the verifier/challenge pair
/// 2. **Server Start**: a loopback HTTP server is spawned for the callback
/// 3. **Browser Launch**: the authorization URL opens in the default browser
/// 4. **Callback Handling**: the server completes the token exchange
/// 5. **Persistence**: the token record lands in the file store for reuse
///
/// Browser launch failures degrade to printing the URL for manual
/// navigation. The wait for the callback times out after 60 seconds.
pub async fn auth() {
    let config = config::AuthConfig::from_env();
    let auth = Arc::new(AuthManager::new(config, FileTokenStore::new()));

    let auth_url = match auth.begin_login().await {
        Ok(url) => url,
        Err(e) => error!("Cannot start login: {}", e),
    };

    let server_auth = Arc::clone(&auth);
    tokio::spawn(async move {
        start_api_server(server_auth).await;
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    if wait_for_login(&auth).await {
        match auth.display_name().await {
            Some(name) => success!("Authentication successful. Logged in as {}.", name),
            None => success!("Authentication successful."),
        }
    } else {
        error!("Authentication failed or timed out.");
    }
}

/// Polls the authenticator until the callback flips it to authenticated.
///
/// Maximum wait 60 seconds, polling once per second. Runs concurrently with
/// the callback server task that performs the actual exchange.
async fn wait_for_login(auth: &AuthManager<FileTokenStore>) -> bool {
    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        if auth.is_authenticated().await {
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    false
}

/// Clears the persisted token record and the in-memory session.
pub async fn logout() {
    let config = config::AuthConfig::from_env();
    let auth = AuthManager::new(config, FileTokenStore::new());
    auth.restore().await;
    auth.logout().await;
    success!("Logged out.");
}
