use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{
    api, config, error,
    management::FileTokenStore,
    spotify::auth::AuthManager,
};

/// Starts the loopback HTTP server that receives the OAuth redirect.
///
/// Runs only for the duration of a login; the auth command drops the task
/// once the callback has been handled.
pub async fn start_api_server(auth: Arc<AuthManager<FileTokenStore>>) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(auth)));

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind callback server on {}: {}", addr, e),
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Callback server failed: {}", e);
    }
}
