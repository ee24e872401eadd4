//! Seller sign-in and sign-out.

use reqwest::header::{HeaderMap, SET_COOKIE};
use sellhub_shared::{ApiError, SignInRequest};

use crate::api_client::{with_credential, ApiClient};
use crate::session::SessionManager;

/// Session token from a sign-in response: the first `Set-Cookie` value up to
/// its first `;`, kept verbatim (`access_token=abc; Path=/` gives
/// `access_token=abc`).
///
/// The header is split as bytes, so values carrying non-ASCII octets are
/// still accepted; any bytes that are not UTF-8 are replaced with U+FFFD.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get_all(SET_COOKIE).iter().next()?.as_bytes();
    let token = raw.split(|b| *b == b';').next().unwrap_or_default();
    if token.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(token).into_owned())
    }
}

impl ApiClient {
    /// Exchange credentials for a session token.
    ///
    /// The backend answers with an empty body and the session in
    /// `Set-Cookie`. A 403 means the credentials were rejected; a success
    /// without the cookie is reported as [`ApiError::MissingCredential`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let resp = self
            .dispatch(self.post("/sellers/sessions").json(&body))
            .await
            .map_err(|e| match e {
                ApiError::Http { status: 403, .. } => ApiError::InvalidCredentials,
                other => other,
            })?;

        extract_session_cookie(resp.headers()).ok_or_else(|| {
            crate::log_error!("sign-in succeeded without a session cookie");
            ApiError::MissingCredential
        })
    }

    /// Invalidate the session server-side. The response body is ignored.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), ApiError> {
        let rb = with_credential(self.post("/sign-out"), access_token).json(&serde_json::json!({}));
        self.dispatch(rb).await?;
        Ok(())
    }
}

/// Sign in against the backend and hold the resulting session.
pub async fn login(
    api: &ApiClient,
    session: &SessionManager,
    email: &str,
    password: &str,
) -> Result<(), ApiError> {
    let token = api.sign_in(email, password).await?;
    session.sign_in(token);
    Ok(())
}

/// Sign out locally, telling the backend on a best-effort basis.
///
/// The local session is cleared whatever the backend call returns.
pub async fn logout(api: &ApiClient, session: &SessionManager) {
    let token = session.access_token_or_empty();
    if !token.is_empty() {
        if let Err(e) = api.sign_out(&token).await {
            crate::log_warn!("server-side sign-out failed: {e}");
        }
    }
    session.sign_out();
}
