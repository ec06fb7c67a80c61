//! Normalized transport errors.

use serde_json::Value;
use thiserror::Error;

/// Fallback message when neither the body nor the status says anything useful.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The backend rejected the request (HTTP 4xx).
    Validation,
    /// The call failed remotely: HTTP 5xx, connection failure, or an unreadable body.
    Remote,
    /// The per-call timeout elapsed.
    Timeout,
}

impl TransportErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Validation => "validation",
            TransportErrorKind::Remote => "remote",
            TransportErrorKind::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed remote call, unwrapped into a single message.
///
/// Displays as the bare message so it can be shown to the user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    status: Option<u16>,
}

impl TransportError {
    /// Creates an error of the given kind.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Validation, message)
    }

    /// Creates a remote error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Remote, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// Builds an error from a non-success HTTP response.
    ///
    /// 4xx is a validation error, anything else is remote. The message is
    /// taken from the body when it carries one.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = if (400..500).contains(&status) {
            TransportErrorKind::Validation
        } else {
            TransportErrorKind::Remote
        };
        let message = message_from_body(body)
            .or_else(|| canonical_reason(status).map(str::to_string))
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        Self {
            kind,
            message,
            status: Some(status),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else {
            TransportErrorKind::Remote
        };
        Self {
            kind,
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

/// Extracts the error message from a backend error body.
///
/// Understands `{"detail": "..."}`, the list form
/// `{"detail": [{"msg": "..."}, ...]}`, and `{"error"|"message": "..."}`.
pub fn message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    ["error", "message"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn canonical_reason(status: u16) -> Option<&'static str> {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
}
