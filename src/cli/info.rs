use chrono::{TimeZone, Utc};

use crate::{
    config, info,
    management::FileTokenStore,
    spotify::auth::{AuthManager, AuthState},
    warning,
};

/// Displays the authentication state and session capabilities.
///
/// Shows whether a persisted login exists, who it belongs to, when the
/// access token expires, and whether the app-level credential fallback is
/// available for anonymous discovery.
pub async fn info() {
    let config = config::AuthConfig::from_env();
    let has_app_credentials = config.client_secret.is_some();

    let auth = AuthManager::new(config, FileTokenStore::new());
    auth.restore().await;

    match auth.state().await {
        AuthState::Authenticated => {
            info!("Logged in.");

            if let Some(expires_at) = auth.token_expires_at().await {
                match Utc.timestamp_opt(expires_at, 0).single() {
                    Some(when) if expires_at > Utc::now().timestamp() => {
                        info!("Access token valid until {}.", when.format("%Y-%m-%d %H:%M:%S UTC"));
                    }
                    Some(when) => {
                        info!(
                            "Access token expired at {}; it will be refreshed on next use.",
                            when.format("%Y-%m-%d %H:%M:%S UTC")
                        );
                    }
                    None => warning!("Stored token has an invalid expiry timestamp."),
                }
            }
        }
        AuthState::AwaitingCallback => info!("Login in progress."),
        AuthState::LoggedOut => info!("Not logged in. Run `swipecli auth` to log in."),
    }

    if has_app_credentials {
        info!("App credentials configured: anonymous discovery available.");
    } else {
        info!("No app credentials: discovery requires a login.");
    }
}
