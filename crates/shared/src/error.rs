//! Shared error types for the seller API client.
//!
//! `Display` on [`ApiError`] is the localized, user-facing text, so UI code can
//! show it directly for every known failure and fall back to its own generic
//! message only for the unexpected ones (see [`ApiError::user_message_or`]).

use serde::Deserialize;

pub const CONNECTIVITY_MESSAGE: &str = "Erro de conexão. Verifique sua internet.";
pub const TIMEOUT_MESSAGE: &str = "Timeout. Verifique sua conexão.";
pub const GENERIC_HTTP_MESSAGE: &str = "Erro ao processar requisição";

/// Largest image accepted for upload, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// The resource an endpoint-specific "not found" refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Product,
    Seller,
    Avatar,
}

impl Resource {
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Resource::Product => "Erro: O produto não foi encontrado.",
            Resource::Seller => "Erro: O vendedor não foi encontrado.",
            Resource::Avatar => "Erro: O avatar não foi encontrado.",
        }
    }
}

/// API error type for client-side use
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response was received at all.
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity { detail: String },
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,
    /// The backend answered with a failure status.
    #[error("{}", http_message(.message))]
    Http { status: u16, message: Option<String> },
    /// Sign-in credentials were rejected.
    #[error("Erro: Credenciais inválidas.")]
    InvalidCredentials,
    /// Sign-in succeeded but the response carried no session cookie.
    #[error("O backend não retornou o token de autenticação.")]
    MissingCredential,
    #[error("{}", .resource.not_found_message())]
    NotFound { resource: Resource },
    /// E-mail or phone already registered.
    #[error("Erro: O e-mail ou telefone já existe.")]
    Conflict,
    #[error("Imagem muito grande! Escolha uma imagem de até 5MB.")]
    ImageTooLarge { size: u64 },
    #[error("Resposta inválida do servidor: {0}")]
    Decode(String),
    #[error("Falha ao ler arquivo: {0}")]
    Io(String),
    #[error("{0}")]
    Other(String),
}

fn http_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(GENERIC_HTTP_MESSAGE)
}

impl ApiError {
    /// HTTP status carried by the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::InvalidCredentials => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict => Some(409),
            _ => None,
        }
    }

    /// Whether this is one of the expected failure shapes with a meaningful
    /// user-facing message.
    pub fn is_known(&self) -> bool {
        !matches!(
            self,
            ApiError::Decode(_) | ApiError::Io(_) | ApiError::Other(_)
        )
    }

    /// The message to show a user: the error's own text when known, otherwise
    /// the caller's fallback.
    pub fn user_message_or(&self, fallback: &str) -> String {
        if self.is_known() {
            self.to_string()
        } else {
            fallback.to_string()
        }
    }

    /// Replace a 404 with the endpoint-specific "not found" error.
    pub fn or_not_found(self, resource: Resource) -> Self {
        match self {
            ApiError::Http { status: 404, .. } => ApiError::NotFound { resource },
            other => other,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract the backend's `message` field from a JSON error body.
/// Blank messages count as absent.
pub fn try_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
    parsed.message.filter(|message| !message.trim().is_empty())
}
