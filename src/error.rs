//! Unified error family for client-side validation and remote failures.

use thiserror::Error;

/// Result type for all client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client.
///
/// Client-side validation failures (`InvalidArgument`) are raised at the
/// offending builder call; everything else is raised at the terminal
/// `query()`/`create()`/`update()`/`delete()` call. The original HTTP status
/// and body are preserved where they exist.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed builder input, detected before any request is made.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The resource does not exist or was already deleted (HTTP 404).
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Missing or insufficient credentials (HTTP 401/403).
    #[error("unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The server rejected the request as invalid (HTTP 400/422).
    #[error("request rejected (HTTP {status}): {message}")]
    InvalidRequest { status: u16, message: String },

    /// The service failed or could not be reached (HTTP 5xx, transport fault).
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// A response the client cannot interpret. Status and raw body are kept
    /// for diagnostics.
    #[error("unexpected response (HTTP {status}): {body}")]
    UnknownRemote { status: u16, body: String },
}

/// Discriminant for [`Error`], for callers that branch on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Unauthorized,
    InvalidRequest,
    ServiceUnavailable,
    UnknownRemote,
}

impl Error {
    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a `ServiceUnavailable` error from a transport-level failure.
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Classify a non-2xx HTTP response into a typed error.
    ///
    /// `resource` names what was being addressed (used for `NotFound`).
    pub(crate) fn from_response(resource: &str, status: u16, body: &[u8]) -> Self {
        match status {
            404 => Self::NotFound {
                resource: resource.to_string(),
            },
            401 | 403 => Self::Unauthorized {
                status,
                message: remote_message(body),
            },
            400 | 422 => Self::InvalidRequest {
                status,
                message: remote_message(body),
            },
            500..=599 => Self::ServiceUnavailable {
                message: format!("HTTP {}: {}", status, remote_message(body)),
            },
            _ => Self::UnknownRemote {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::UnknownRemote { .. } => ErrorKind::UnknownRemote,
        }
    }

    /// True for errors raised before any request was sent.
    pub fn is_client_side(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

/// Extract the server's validation message from an error body.
///
/// GitLab-style APIs report errors as `{"message": ...}` or `{"error": "..."}`;
/// `message` may itself be an object or array of per-field complaints.
fn remote_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }
    String::from_utf8_lossy(body).into_owned()
}
