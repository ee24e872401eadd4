//! Dioxus bindings for [`SessionManager`].

use dioxus::prelude::*;
use sellhub_shared::ApiError;

use crate::api_client::ApiClient;
use crate::config::ClientConfig;
use crate::session::{SessionManager, SessionState};

/// Session context provided to the component tree
#[derive(Clone)]
pub struct SessionContext {
    pub state: Signal<SessionState>,
    manager: SessionManager,
    api: Result<ApiClient, ApiError>,
}

impl SessionContext {
    pub fn sign_in(&self, token: impl Into<String>) {
        self.manager.sign_in(token);
        mirror(self.state, self.manager.state());
    }

    pub fn sign_out(&self) {
        self.manager.sign_out();
        mirror(self.state, self.manager.state());
    }

    /// Current token. Reading it subscribes the calling component to session
    /// changes; the value itself comes from the manager, so it is never behind
    /// a sign-in, a sign-out or a 401 that the signal has not caught up with.
    pub fn session(&self) -> Option<String> {
        let _ = self.state.read();
        self.manager.session()
    }

    pub fn is_loading(&self) -> bool {
        let _ = self.state.read();
        self.manager.is_loading()
    }

    pub fn access_token_or_empty(&self) -> String {
        self.session().unwrap_or_default()
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// API client that signs this session out when the backend answers 401.
    pub fn api(&self) -> Result<ApiClient, ApiError> {
        self.api.clone()
    }
}

fn mirror(mut state: Signal<SessionState>, next: SessionState) {
    if *state.peek() != next {
        state.set(next);
    }
}

/// Loads the stored session, mirrors every change into a signal and provides
/// an [`ApiClient`] wired to the session's 401 hook.
///
/// `config` is read once, when the provider mounts.
#[component]
pub fn SessionProvider(
    manager: SessionManager,
    #[props(default)] config: ClientConfig,
    children: Element,
) -> Element {
    let state = use_signal(|| manager.state());

    let watched = manager.clone();
    use_future(move || {
        let manager = watched.clone();
        async move {
            let mut updates = manager.subscribe();
            manager.load().await;
            loop {
                let current = updates.borrow_and_update().clone();
                mirror(state, current);
                if updates.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    let api = use_hook(|| match ApiClient::new(&config) {
        Ok(api) => Ok(api.with_unauthorized_hook(manager.unauthorized_hook())),
        Err(e) => {
            crate::log_error!("failed to build the API client: {e}");
            Err(e)
        }
    });

    use_context_provider(|| SessionContext {
        state,
        manager: manager.clone(),
        api,
    });

    children
}

/// Renders nothing until the stored session is loaded, then one of the two
/// branches depending on whether a seller is signed in.
#[component]
pub fn SessionGate(authenticated: Element, anonymous: Element) -> Element {
    let session = use_session();
    let state = session.state.read().clone();

    match state {
        SessionState::Loading => rsx! {},
        SessionState::Authenticated(_) => authenticated,
        SessionState::Unauthenticated => anonymous,
    }
}

pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
}

pub fn use_api_client() -> Result<ApiClient, ApiError> {
    use_session().api()
}

#[cfg(all(test, feature = "ui"))]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use dioxus::dioxus_core::{NoOpMutations, VirtualDom};
    use tokio::sync::Notify;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::storage::{MemorySessionStore, SessionStore};

    thread_local! {
        static RENDERED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
        static CONTEXT: RefCell<Option<SessionContext>> = const { RefCell::new(None) };
    }

    #[derive(Clone)]
    struct HarnessProps {
        manager: SessionManager,
        config: ClientConfig,
    }

    fn harness(props: HarnessProps) -> Element {
        rsx! {
            SessionProvider { manager: props.manager.clone(), config: props.config.clone(),
                Capture {}
                SessionGate {
                    authenticated: rsx! { Branch { name: "authenticated" } },
                    anonymous: rsx! { Branch { name: "anonymous" } },
                }
            }
        }
    }

    #[component]
    fn Capture() -> Element {
        let session = use_session();
        CONTEXT.with(|slot| *slot.borrow_mut() = Some(session));
        rsx! {}
    }

    #[component]
    fn Branch(name: String) -> Element {
        RENDERED.with(|log| log.borrow_mut().push(name.clone()));
        rsx! {}
    }

    /// Store whose read completes only once released.
    struct HeldStore {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl SessionStore for HeldStore {
        async fn read(&self) -> Option<String> {
            self.release.notified().await;
            Some("access_token=held".to_string())
        }

        async fn write(&self, _token: Option<&str>) {}
    }

    fn mount(manager: SessionManager, config: ClientConfig) -> VirtualDom {
        RENDERED.with(|log| log.borrow_mut().clear());
        let mut dom = VirtualDom::new_with_props(harness, HarnessProps { manager, config });
        dom.rebuild_in_place();
        dom
    }

    /// Run tasks and re-render until the tree is idle.
    async fn settle(dom: &mut VirtualDom) {
        while tokio::time::timeout(Duration::from_millis(50), dom.wait_for_work())
            .await
            .is_ok()
        {
            dom.render_immediate(&mut NoOpMutations);
        }
    }

    fn rendered() -> Vec<String> {
        RENDERED.with(|log| log.borrow().clone())
    }

    fn context() -> SessionContext {
        CONTEXT
            .with(|slot| slot.borrow().clone())
            .expect("context captured")
    }

    #[tokio::test]
    async fn gate_waits_for_the_stored_session() {
        let release = Arc::new(Notify::new());
        let manager = SessionManager::new(Arc::new(HeldStore {
            release: release.clone(),
        }));
        let mut dom = mount(manager, ClientConfig::default());

        settle(&mut dom).await;
        assert!(rendered().is_empty());
        assert!(dom.in_runtime(|| context().is_loading()));

        release.notify_one();
        settle(&mut dom).await;
        assert_eq!(rendered(), ["authenticated"]);
        assert_eq!(
            dom.in_runtime(|| context().session()).as_deref(),
            Some("access_token=held")
        );
    }

    #[tokio::test]
    async fn sign_in_and_out_are_visible_immediately() {
        let manager = SessionManager::new(Arc::new(MemorySessionStore::new()));
        let mut dom = mount(manager.clone(), ClientConfig::default());
        settle(&mut dom).await;
        assert_eq!(rendered(), ["anonymous"]);

        let (session, token, state) = dom.in_runtime(|| {
            let ctx = context();
            ctx.sign_in("access_token=T");
            (ctx.session(), ctx.access_token_or_empty(), ctx.state.peek().clone())
        });
        assert_eq!(session.as_deref(), Some("access_token=T"));
        assert_eq!(token, "access_token=T");
        assert_eq!(state, SessionState::Authenticated("access_token=T".into()));
        assert_eq!(manager.session().as_deref(), Some("access_token=T"));

        settle(&mut dom).await;
        assert_eq!(rendered(), ["anonymous", "authenticated"]);

        let (session, token) = dom.in_runtime(|| {
            let ctx = context();
            ctx.sign_out();
            (ctx.session(), ctx.access_token_or_empty())
        });
        assert_eq!(session, None);
        assert_eq!(token, "");

        settle(&mut dom).await;
        assert_eq!(rendered(), ["anonymous", "authenticated", "anonymous"]);
    }

    #[tokio::test]
    async fn unauthorized_response_from_provided_client_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let manager = SessionManager::new(Arc::new(MemorySessionStore::with_token(
            "access_token=stale",
        )));
        let config = ClientConfig::default().with_base_url(server.uri());
        let mut dom = mount(manager, config);
        settle(&mut dom).await;
        assert_eq!(rendered(), ["authenticated"]);

        let (api, token) = dom.in_runtime(|| {
            let ctx = context();
            (ctx.api().unwrap(), ctx.access_token_or_empty())
        });
        assert_eq!(api.base_url(), server.uri());
        let err = api.list_categories(&token).await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        assert_eq!(dom.in_runtime(|| context().session()), None);
        settle(&mut dom).await;
        assert_eq!(rendered(), ["authenticated", "anonymous"]);
    }
}
