//! Session lifecycle: load from storage, sign in, sign out, persist.
//!
//! [`SessionManager`] owns the only piece of shared mutable state in the
//! client, the current session token. Everything else reads it at call time
//! through [`SessionManager::access_token_or_empty`].
//!
//! ```text
//! Loading ──load()──► Authenticated(token) ◄──sign_in()── Unauthenticated
//!    └─────load()───► Unauthenticated ◄──sign_out() / HTTP 401──┘
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::sync::{watch, Mutex};

use crate::api_client::UnauthorizedHook;
use crate::storage::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The persisted session has not been read yet.
    Loading,
    Authenticated(String),
    Unauthenticated,
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated(token) => Some(token.as_str()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

struct Inner {
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
    persist_lock: Mutex<()>,
}

/// Shared handle to the session. Clones refer to the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.inner.state.borrow() {
            SessionState::Loading => "loading",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Unauthenticated => "unauthenticated",
        };
        f.debug_struct("SessionManager").field("state", &state).finish()
    }
}

impl PartialEq for SessionManager {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl SessionManager {
    /// A manager in the `Loading` state. Call [`load`](Self::load) to resolve it.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            inner: Arc::new(Inner {
                store,
                state,
                persist_lock: Mutex::new(()),
            }),
        }
    }

    /// Construct and load in one step.
    pub async fn restore(store: Arc<dyn SessionStore>) -> Self {
        let manager = Self::new(store);
        manager.load().await;
        manager
    }

    /// Resolve `Loading` from the store. Only the first completed read has an
    /// effect; later calls return the current state untouched.
    pub async fn load(&self) -> SessionState {
        if !self.is_loading() {
            return self.state();
        }

        let stored = self.inner.store.read().await;
        let resolved = self.inner.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = match &stored {
                Some(token) => SessionState::Authenticated(token.clone()),
                None => SessionState::Unauthenticated,
            };
            true
        });

        if resolved {
            crate::log_info!(
                "session loaded ({})",
                if stored.is_some() { "authenticated" } else { "unauthenticated" }
            );
        }
        self.state()
    }

    /// Hold `token` as the current session and persist it in the background.
    /// An empty token signs out instead.
    pub fn sign_in(&self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            crate::log_warn!("sign-in with an empty token; treating as sign-out");
            self.sign_out();
            return;
        }
        self.transition(SessionState::Authenticated(token));
    }

    /// Drop the current session and clear it from storage in the background.
    pub fn sign_out(&self) {
        self.transition(SessionState::Unauthenticated);
    }

    fn transition(&self, next: SessionState) {
        let applied = self.inner.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            let changed = *state != next;
            *state = next.clone();
            changed
        });

        if self.is_loading() {
            crate::log_warn!("session change ignored while the stored session is loading");
            return;
        }
        if applied {
            crate::log_info!(
                "session {}",
                if next.is_authenticated() { "signed in" } else { "signed out" }
            );
        }
        self.schedule_persist();
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn session(&self) -> Option<String> {
        self.inner.state.borrow().token().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    /// The token when there is a non-empty one, otherwise `""`. Suitable for
    /// direct use as a header value.
    pub fn access_token_or_empty(&self) -> String {
        self.session().unwrap_or_default()
    }

    /// Observe state changes. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Write the current state to the store.
    ///
    /// Writes are serialized and always use the state at write time, so the
    /// last write to finish matches the in-memory session.
    pub async fn persist(&self) {
        let _guard = self.inner.persist_lock.lock().await;
        let state = self.state();
        if state.is_loading() {
            return;
        }
        self.inner.store.write(state.token()).await;
    }

    fn schedule_persist(&self) {
        let manager = self.clone();
        spawn(async move { manager.persist().await });
    }

    /// Callback for the HTTP pipeline that signs this session out.
    ///
    /// The hook holds a weak handle: once every manager clone is dropped it
    /// does nothing.
    pub fn unauthorized_hook(&self) -> UnauthorizedHook {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                SessionManager { inner }.sign_out();
            }
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(fut);
        }
        Err(_) => crate::log_warn!("no async runtime; session change kept in memory only"),
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(fut);
}
