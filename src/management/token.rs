use std::{path::PathBuf, sync::Mutex};

use serde_json::{Value, json};

use crate::{types::TokenRecord, warning};

const KEY_ACCESS_TOKEN: &str = "spotify_access_token";
const KEY_REFRESH_TOKEN: &str = "spotify_refresh_token";
const KEY_EXPIRATION: &str = "spotify_token_expiration";

/// Storage for the current token record.
///
/// Deliberately infallible: a missing or corrupt persisted value reads as
/// absent, and persistence failures are logged and swallowed. Losing a token
/// only means the user logs in again.
#[allow(async_fn_in_trait)]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Option<TokenRecord>;
    async fn set(&self, record: &TokenRecord);
    async fn clear(&self);
}

/// Token store persisting three stable keys as a JSON object in the local
/// data directory, so the session survives process restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("swipecli/cache/token.json");
        FileTokenStore { path }
    }

    /// Store rooted at an explicit path, for tests.
    pub fn at(path: PathBuf) -> Self {
        FileTokenStore { path }
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for FileTokenStore {
    async fn get(&self) -> Option<TokenRecord> {
        let content = async_fs::read_to_string(&self.path).await.ok()?;
        let value: Value = serde_json::from_str(&content).ok()?;

        let access_token = value.get(KEY_ACCESS_TOKEN)?.as_str()?.to_string();
        let refresh_token = value
            .get(KEY_REFRESH_TOKEN)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let expires_at = value.get(KEY_EXPIRATION)?.as_i64()?;

        Some(TokenRecord {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    async fn set(&self, record: &TokenRecord) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = async_fs::create_dir_all(parent).await {
                warning!("Failed to create token cache directory: {}", e);
                return;
            }
        }

        let value = json!({
            KEY_ACCESS_TOKEN: record.access_token,
            KEY_REFRESH_TOKEN: record.refresh_token,
            KEY_EXPIRATION: record.expires_at,
        });
        let content = value.to_string();

        if let Err(e) = async_fs::write(&self.path, content).await {
            warning!("Failed to persist token: {}", e);
        }
    }

    async fn clear(&self) {
        // A token file that was never written is already cleared.
        let _ = async_fs::remove_file(&self.path).await;
    }
}

/// In-memory token store used by tests and fakes.
#[derive(Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: TokenRecord) -> Self {
        MemoryTokenStore {
            record: Mutex::new(Some(record)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<TokenRecord> {
        self.record.lock().unwrap().clone()
    }

    async fn set(&self, record: &TokenRecord) {
        *self.record.lock().unwrap() = Some(record.clone());
    }

    async fn clear(&self) {
        *self.record.lock().unwrap() = None;
    }
}
