//! Transport failures and their translation into user-facing messages.

use shared::error::{ErrorBody, FailureKind};
use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str = "Tempo de resposta excedido. Tente novamente.";
pub const UNREACHABLE_MESSAGE: &str = "Servidor indisponível ou sem conexão. Tente novamente.";
pub const INVALID_INPUT_MESSAGE: &str =
    "Entrada inválida. Verifique os parâmetros e tente novamente.";
pub const NOT_FOUND_MESSAGE: &str = "Recurso não encontrado.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno. Tente novamente em instantes.";
pub const REQUEST_FAILED_MESSAGE: &str = "Falha na requisição. Tente novamente.";

/// Failure produced by a [`crate::DirectoryApi`] call. Only `Status` and
/// `Decode` carry a response from the server.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network failure: {0}")]
    Network(String),
    #[error("server responded with status {status}")]
    Status {
        status: u16,
        body: Option<ErrorBody>,
    },
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(status: u16, body: Option<ErrorBody>) -> Self {
        Self::Status { status, body }
    }

    pub fn has_response(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Decode(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(status.as_u16(), None)
        } else {
            Self::Network(err.to_string())
        }
    }
}

pub fn classify(err: &TransportError) -> FailureKind {
    match err {
        TransportError::Timeout => FailureKind::Timeout,
        TransportError::Network(_) => FailureKind::NetworkUnavailable,
        TransportError::Status { status, .. } => FailureKind::from_status(*status),
        TransportError::Decode(_) => FailureKind::Generic,
    }
}

/// Collapses any transport failure into the single message shown to the user.
///
/// Detail text sent by the server is surfaced for client-side failures only;
/// for 5xx responses it is dropped so internals never reach the screen.
pub fn normalize(err: &TransportError) -> String {
    let detail = match err {
        TransportError::Status {
            body: Some(body), ..
        } => body.detail_text(),
        _ => None,
    };

    match classify(err) {
        FailureKind::Timeout => TIMEOUT_MESSAGE.to_string(),
        FailureKind::NetworkUnavailable => UNREACHABLE_MESSAGE.to_string(),
        FailureKind::Validation => detail.unwrap_or_else(|| INVALID_INPUT_MESSAGE.to_string()),
        FailureKind::NotFound => detail.unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
        FailureKind::Server => INTERNAL_ERROR_MESSAGE.to_string(),
        FailureKind::Generic => detail.unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
