//! Typed wrappers for the backend's REST endpoints.
//!
//! Each wrapper makes exactly one request. Protected endpoints take the
//! session token (usually `SessionManager::access_token_or_empty()`) and send
//! it as the `Cookie` header.

pub mod attachments;
pub mod categories;
pub mod products;
pub mod sellers;
pub mod sessions;

pub use attachments::ImageUpload;
pub use sessions::{extract_session_cookie, login, logout};
