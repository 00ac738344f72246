use std::{collections::HashMap, time::Duration};

use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::{
    config::AuthConfig,
    error::AuthError,
    management::TokenStore,
    types::{TokenRecord, TokenResponse},
    utils, warning,
};

/// Authentication lifecycle states.
///
/// `LoggedOut -> AwaitingCallback -> Authenticated`, with expiry handled by
/// refreshing in place and falling back to `LoggedOut` when the refresh
/// grant is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    AwaitingCallback,
    Authenticated,
}

struct AuthInner {
    state: AuthState,
    record: Option<TokenRecord>,
    verifier: Option<String>,
    display_name: Option<String>,
    /// Separate userless token from the client-credentials grant. Never
    /// interchangeable with the user session: it cannot reach user-scoped
    /// endpoints.
    app_token: Option<TokenRecord>,
}

/// OAuth 2.0 PKCE authenticator with a client-credentials fallback.
///
/// Owns the verifier/challenge pair for the pending login, the current user
/// token record (mirrored into the [`TokenStore`] on every change), and an
/// independent app-level token so public search keeps working without a
/// logged-in user.
///
/// All token state sits behind one async mutex which is held across refresh
/// requests, so concurrent [`active_token`](Self::active_token) callers
/// await a single in-flight refresh instead of issuing duplicates.
pub struct AuthManager<S: TokenStore> {
    config: AuthConfig,
    http: Client,
    store: S,
    inner: Mutex<AuthInner>,
}

impl<S: TokenStore> AuthManager<S> {
    pub fn new(config: AuthConfig, store: S) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to construct HTTP client");

        AuthManager {
            config,
            http,
            store,
            inner: Mutex::new(AuthInner {
                state: AuthState::LoggedOut,
                record: None,
                verifier: None,
                display_name: None,
                app_token: None,
            }),
        }
    }

    /// Seeds the in-memory session from the token store, so a persisted
    /// session survives process restarts. An expired record is still loaded;
    /// the next [`active_token`](Self::active_token) call refreshes it.
    pub async fn restore(&self) {
        if let Some(record) = self.store.get().await {
            let mut inner = self.inner.lock().await;
            inner.record = Some(record);
            inner.state = AuthState::Authenticated;
        }
    }

    /// Starts a login: generates the PKCE verifier/challenge pair, stores
    /// the verifier for the pending exchange, and returns the authorization
    /// URL to open in a browser.
    pub async fn begin_login(&self) -> Result<String, AuthError> {
        if self.config.client_id.is_empty() || self.config.redirect_uri.is_empty() {
            return Err(AuthError::ConfigurationError(
                "client id and redirect URI must be configured".into(),
            ));
        }

        let verifier = utils::generate_code_verifier();
        let challenge = utils::generate_code_challenge(&verifier);

        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", challenge.as_str()),
            ],
        )
        .map_err(|e| AuthError::ConfigurationError(e.to_string()))?;

        let mut inner = self.inner.lock().await;
        inner.verifier = Some(verifier);
        inner.state = AuthState::AwaitingCallback;

        Ok(url.to_string())
    }

    /// Completes the login from the OAuth redirect URL.
    ///
    /// An `error` query parameter aborts the login; a missing `code` is a
    /// malformed callback. Otherwise the code and the stored verifier are
    /// exchanged for a token pair, which is persisted, and the profile
    /// display name is fetched best-effort.
    pub async fn handle_callback(&self, url: &str) -> Result<(), AuthError> {
        let parsed = Url::parse(url).map_err(|_| AuthError::MalformedCallback)?;
        let params: HashMap<String, String> = parsed.query_pairs().into_owned().collect();

        let mut inner = self.inner.lock().await;

        if let Some(error) = params.get("error") {
            inner.state = AuthState::LoggedOut;
            inner.verifier = None;
            return Err(AuthError::AuthorizationDenied(error.clone()));
        }

        let Some(code) = params.get("code") else {
            return Err(AuthError::MalformedCallback);
        };

        let Some(verifier) = inner.verifier.take() else {
            return Err(AuthError::ConfigurationError(
                "no login in progress".into(),
            ));
        };

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.config.client_id),
                ("code", code),
                ("code_verifier", &verifier),
                ("redirect_uri", &self.config.redirect_uri),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            inner.state = AuthState::LoggedOut;
            return Err(AuthError::ExchangeFailed(status));
        }

        let token: TokenResponse = response.json().await?;
        let record = token.into_record(None);

        self.store.set(&record).await;
        inner.record = Some(record);
        inner.state = AuthState::Authenticated;

        // Best-effort; a profile failure never reverts the authentication.
        match self.fetch_display_name(&inner).await {
            Ok(name) => inner.display_name = Some(name),
            Err(e) => warning!("Could not fetch user profile: {}", e),
        }

        Ok(())
    }

    /// Exchanges the stored refresh token for a fresh access token.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let mut inner = self.inner.lock().await;
        self.refresh_locked(&mut inner).await
    }

    async fn refresh_locked(&self, inner: &mut AuthInner) -> Result<(), AuthError> {
        let Some(refresh_token) = inner.record.as_ref().and_then(|r| r.refresh_token.clone())
        else {
            inner.state = AuthState::LoggedOut;
            inner.record = None;
            return Err(AuthError::NoRefreshToken);
        };

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
                ("client_id", &self.config.client_id),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            inner.state = AuthState::LoggedOut;
            inner.record = None;
            return Err(AuthError::RefreshFailed(status));
        }

        let token: TokenResponse = response.json().await?;
        // Rotate the refresh token when the provider supplies a new one.
        let record = token.into_record(Some(refresh_token));

        self.store.set(&record).await;
        inner.record = Some(record);
        inner.state = AuthState::Authenticated;
        Ok(())
    }

    /// Returns a usable bearer token.
    ///
    /// Preference order: unexpired user token, refreshed user token,
    /// app-level client-credentials token. A token whose expiry equals the
    /// current instant counts as expired. Fails with
    /// [`AuthError::NotAuthenticated`] only when every path is unavailable.
    pub async fn active_token(&self) -> Result<String, AuthError> {
        let mut inner = self.inner.lock().await;

        if let Some(record) = &inner.record {
            if !record.is_expired() {
                return Ok(record.access_token.clone());
            }
        }

        if inner
            .record
            .as_ref()
            .is_some_and(|r| r.refresh_token.is_some())
        {
            match self.refresh_locked(&mut inner).await {
                Ok(()) => {
                    if let Some(record) = &inner.record {
                        return Ok(record.access_token.clone());
                    }
                }
                Err(e) => warning!("Token refresh failed, trying app credentials: {}", e),
            }
        }

        self.app_token_locked(&mut inner).await
    }

    async fn app_token_locked(&self, inner: &mut AuthInner) -> Result<String, AuthError> {
        if let Some(app) = &inner.app_token {
            if !app.is_expired() {
                return Ok(app.access_token.clone());
            }
        }

        let Some(secret) = self.config.client_secret.as_deref() else {
            return Err(AuthError::NotAuthenticated);
        };

        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                warning!("App credential request failed: {}", e);
                AuthError::NotAuthenticated
            })?;

        if response.status().as_u16() != 200 {
            return Err(AuthError::NotAuthenticated);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|_| AuthError::NotAuthenticated)?;
        let record = token.into_record(None);
        let access = record.access_token.clone();
        inner.app_token = Some(record);

        Ok(access)
    }

    /// Clears the in-memory session and the persisted token record.
    pub async fn logout(&self) {
        let mut inner = self.inner.lock().await;
        inner.record = None;
        inner.verifier = None;
        inner.display_name = None;
        inner.app_token = None;
        inner.state = AuthState::LoggedOut;
        self.store.clear().await;
    }

    /// Configured redirect URI, needed to reconstruct the callback URL.
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    pub async fn state(&self) -> AuthState {
        self.inner.lock().await.state
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.state == AuthState::Authenticated
    }

    pub async fn display_name(&self) -> Option<String> {
        self.inner.lock().await.display_name.clone()
    }

    /// Expiry of the current user token, for status output.
    pub async fn token_expires_at(&self) -> Option<i64> {
        self.inner.lock().await.record.as_ref().map(|r| r.expires_at)
    }

    async fn fetch_display_name(&self, inner: &AuthInner) -> Result<String, AuthError> {
        let Some(record) = &inner.record else {
            return Err(AuthError::NotAuthenticated);
        };

        let url = format!("{}/me", self.config.api_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&record.access_token)
            .send()
            .await?;

        let json: serde_json::Value = response.json().await?;
        json["display_name"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(AuthError::NotAuthenticated)
    }
}
