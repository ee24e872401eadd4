//! HTTP API client for the marketplace backend.
//!
//! Every request runs through [`ApiClient::dispatch`], which normalizes
//! transport failures into [`ApiError`] and invokes the injected
//! unauthorized hook when the backend answers 401.

use std::fmt;
use std::sync::Arc;

use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use sellhub_shared::{try_error_message, ApiError};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;

/// Origin the backend embeds in attachment URLs it generates.
pub const BACKEND_ASSET_ORIGIN: &str = "http://localhost:3333";

/// Callback run when a response reports the session as unauthenticated.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// HTTP client for the seller API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the configured backend.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            on_unauthorized: None,
        })
    }

    /// Run `hook` whenever a response carries HTTP 401.
    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }

    /// Point backend-generated asset URLs at the configured base URL.
    pub fn resolve_asset_url(&self, url: &str) -> String {
        match url.strip_prefix(BACKEND_ASSET_ORIGIN) {
            Some(rest) => format!("{}{rest}", self.base_url),
            None => url.to_string(),
        }
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    /// Send one request and normalize the outcome.
    ///
    /// Returns the response only for 2xx statuses. A 401 runs the
    /// unauthorized hook before the error is returned.
    pub(crate) async fn dispatch(&self, rb: RequestBuilder) -> Result<Response, ApiError> {
        let resp = rb.send().await.map_err(normalize_send_error)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::UNAUTHORIZED {
            crate::log_warn!("{} answered 401; signing out", resp.url().path());
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
        }

        let body = resp.text().await.unwrap_or_default();
        crate::log_debug!("request failed with HTTP {}", status.as_u16());
        Err(ApiError::Http {
            status: status.as_u16(),
            message: try_error_message(&body),
        })
    }

    /// Dispatch and decode a JSON success body.
    pub(crate) async fn dispatch_json<T: DeserializeOwned>(
        &self,
        rb: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self.dispatch(rb).await?;
        let text = resp.text().await.map_err(normalize_send_error)?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Attach the session credential. The header is sent even when the token is
/// empty, so the backend rejects the call as unauthenticated.
pub(crate) fn with_credential(rb: RequestBuilder, access_token: &str) -> RequestBuilder {
    rb.header(COOKIE, access_token)
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(config: &ClientConfig) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ApiError::Other(format!("failed to build HTTP client: {e}")))
}

// The browser fetch backend has no client-wide timeout.
#[cfg(target_arch = "wasm32")]
fn build_client(_config: &ClientConfig) -> Result<Client, ApiError> {
    Ok(Client::new())
}

fn normalize_send_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        crate::log_warn!("request timed out");
        return ApiError::Timeout;
    }
    if e.is_builder() {
        return ApiError::Other(e.to_string());
    }
    if e.is_decode() {
        return ApiError::Decode(e.to_string());
    }
    // The backend did answer; these are not connectivity problems.
    if let Some(status) = e.status() {
        return ApiError::Http {
            status: status.as_u16(),
            message: None,
        };
    }
    if e.is_redirect() || e.is_body() {
        crate::log_warn!("unusable response from backend: {e}");
        return ApiError::Other(e.to_string());
    }
    crate::log_warn!("no response from backend: {e}");
    ApiError::Connectivity {
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::default().with_base_url(base)).unwrap()
    }

    #[test]
    fn joins_paths_onto_base_url() {
        let api = client("http://10.0.0.2:3333/");
        assert_eq!(api.url("/sellers/me"), "http://10.0.0.2:3333/sellers/me");
        assert_eq!(api.url("categories"), "http://10.0.0.2:3333/categories");
        assert_eq!(api.url("https://cdn.example/x"), "https://cdn.example/x");
    }

    #[test]
    fn rewrites_backend_asset_urls() {
        let api = client("http://192.168.15.174:3333");
        assert_eq!(
            api.resolve_asset_url("http://localhost:3333/uploads/a.png"),
            "http://192.168.15.174:3333/uploads/a.png"
        );
        assert_eq!(
            api.resolve_asset_url("https://cdn.example/a.png"),
            "https://cdn.example/a.png"
        );
    }

    #[test]
    fn debug_hides_hook() {
        let api = client("http://localhost:3333").with_unauthorized_hook(Arc::new(|| {}));
        let debug = format!("{api:?}");
        assert!(debug.contains("on_unauthorized: true"));
    }
}
