//! Durable storage for the session token.
//!
//! Backings per platform:
//! - Web: `localStorage`
//! - Native: a JSON file in the platform config directory:
//!   - Linux: `~/.config/sellhub/`
//!   - macOS: `~/Library/Application Support/sellhub/`
//!   - Windows: `%APPDATA%\sellhub\`
//!
//! Stores never surface errors. Anything that cannot be read back resolves to
//! `None`, and failed writes are logged and dropped, so startup always
//! terminates with a definite session state.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// On-disk / localStorage representation of a session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    access_token: String,
}

fn encode(token: &str) -> Option<String> {
    serde_json::to_string(&PersistedSession {
        access_token: token.to_string(),
    })
    .ok()
}

fn decode(raw: &str) -> Option<String> {
    let stored: PersistedSession = serde_json::from_str(raw).ok()?;
    Some(stored.access_token).filter(|token| !token.is_empty())
}

/// Key/value slot holding at most one session token.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait SessionStore: Send + Sync {
    /// The stored token, or `None` when missing, unreadable or empty.
    async fn read(&self) -> Option<String>;

    /// Persist `Some(token)` or clear the slot with `None`.
    async fn write(&self, token: Option<&str>);
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SessionStore for MemorySessionStore {
    async fn read(&self) -> Option<String> {
        let slot = self.slot.lock().ok()?;
        slot.clone().filter(|token| !token.is_empty())
    }

    async fn write(&self, token: Option<&str>) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = token.map(str::to_string),
            Err(_) => crate::log_warn!("session memory store poisoned; write dropped"),
        }
    }
}

// =========================================
// Native implementation
// =========================================

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileSessionStore;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;

    use super::{decode, encode, SessionStore};

    /// Session token kept as a small JSON document on disk.
    #[derive(Debug, Clone)]
    pub struct FileSessionStore {
        path: PathBuf,
    }

    impl FileSessionStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// Store under the platform config directory, or `None` when the
        /// platform has no such directory.
        pub fn in_config_dir(key: &str) -> Option<Self> {
            let dir = dirs::config_dir()?.join("sellhub");
            Some(Self::new(dir.join(file_name(key))))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    /// Sanitize a storage key into a valid file name.
    fn file_name(key: &str) -> String {
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        format!("{safe_key}.json")
    }

    #[async_trait]
    impl SessionStore for FileSessionStore {
        async fn read(&self) -> Option<String> {
            let raw = tokio::fs::read_to_string(&self.path).await.ok()?;
            let token = decode(&raw);
            if token.is_none() {
                crate::log_warn!("ignoring unreadable session file {}", self.path.display());
            }
            token
        }

        async fn write(&self, token: Option<&str>) {
            let result = match token.and_then(encode) {
                Some(json) => {
                    if let Some(parent) = self.path.parent() {
                        if let Err(e) = tokio::fs::create_dir_all(parent).await {
                            crate::log_warn!("failed to create {}: {e}", parent.display());
                            return;
                        }
                    }
                    // Readers must never observe a half-written file.
                    let tmp = self.path.with_extension("json.tmp");
                    match tokio::fs::write(&tmp, json).await {
                        Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
                        Err(e) => Err(e),
                    }
                }
                None => match tokio::fs::remove_file(&self.path).await {
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };

            if let Err(e) = result {
                crate::log_warn!("failed to persist session to {}: {e}", self.path.display());
            }
        }
    }

}

// =========================================
// Web (WASM) implementation
// =========================================

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageSessionStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use async_trait::async_trait;

    use super::{decode, encode, SessionStore};

    /// Session token kept in the browser's `localStorage`.
    #[derive(Debug, Clone)]
    pub struct LocalStorageSessionStore {
        key: String,
    }

    impl LocalStorageSessionStore {
        pub fn new(key: impl Into<String>) -> Self {
            Self { key: key.into() }
        }
    }

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    #[async_trait(?Send)]
    impl SessionStore for LocalStorageSessionStore {
        async fn read(&self) -> Option<String> {
            let raw = local_storage()?.get_item(&self.key).ok()??;
            decode(&raw)
        }

        async fn write(&self, token: Option<&str>) {
            let Some(storage) = local_storage() else {
                crate::log_warn!("localStorage unavailable; session not persisted");
                return;
            };
            let result = match token.and_then(encode) {
                Some(json) => storage.set_item(&self.key, &json),
                None => storage.remove_item(&self.key),
            };
            if result.is_err() {
                crate::log_warn!("failed to persist session to localStorage");
            }
        }
    }
}

/// The durable store for this platform, falling back to memory when there is
/// nowhere to persist.
pub fn platform_store(key: &str) -> Arc<dyn SessionStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Arc::new(LocalStorageSessionStore::new(key))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        match FileSessionStore::in_config_dir(key) {
            Some(store) => Arc::new(store),
            None => {
                crate::log_warn!("no config directory; session will not survive restarts");
                Arc::new(MemorySessionStore::new())
            }
        }
    }
}
