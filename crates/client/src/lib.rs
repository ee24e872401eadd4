//! SellHub client - session lifecycle and authenticated API access
//!
//! This crate holds the core of the marketplace seller app: the persisted
//! session, the HTTP pipeline that signs the seller out on HTTP 401, and
//! typed wrappers for the backend endpoints.

pub mod logging;

pub mod api_client;
pub mod config;
pub mod endpoints;
pub mod session;
pub mod storage;

#[cfg(feature = "ui")]
pub mod provider;

pub use api_client::{ApiClient, UnauthorizedHook};
pub use config::ClientConfig;
pub use endpoints::{login, logout, ImageUpload};
pub use session::{SessionManager, SessionState};
pub use storage::{platform_store, MemorySessionStore, SessionStore};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileSessionStore;

pub use sellhub_shared as shared;
