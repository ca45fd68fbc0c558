//! Error types for the Salt API client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, and input validation errors.

use std::fmt;
use thiserror::Error;

/// Maximum number of characters of an error body kept in a [`ProtocolError`].
const MAX_BODY_CHARS: usize = 4096;

/// The unified error type for Salt API operations.
///
/// Every variant that relates to a request carries the endpoint it was sent
/// to, so callers can log the failure without re-deriving its context.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, serialization).
    #[error("transport error on {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    /// Authentication errors (login failure, token rejected twice).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (non-200 status, malformed envelope).
    #[error("protocol error on {endpoint}: {source}")]
    Protocol {
        endpoint: String,
        #[source]
        source: ProtocolError,
    },

    /// Input validation errors (invalid address, bad configuration).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    pub(crate) fn transport(endpoint: &str, source: TransportError) -> Self {
        Error::Transport {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn protocol(endpoint: &str, source: ProtocolError) -> Self {
        Error::Protocol {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    /// Check if this error points at a credential or configuration problem
    /// rather than a network blip.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Returns the HTTP status involved in this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol { source, .. } => source.status(),
            Error::Auth(AuthError::Rejected { .. }) => Some(crate::policy::UNAUTHORIZED),
            Error::Auth(AuthError::Login { source }) => source.status(),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The request could not be built or its body serialized.
    #[error("cannot prepare request: {message}")]
    Request { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl TransportError {
    /// Classify a reqwest error, reporting `timeout` for timed-out requests.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_builder() || err.is_body() {
            TransportError::Request {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login endpoint could not issue a session token.
    #[error("Salt API authentication failed: {source}")]
    Login {
        #[source]
        source: Box<Error>,
    },

    /// The server rejected a freshly issued token.
    #[error("token rejected on {endpoint} after re-authentication")]
    Rejected { endpoint: String },
}

/// Protocol-level errors from Salt API responses.
#[derive(Debug)]
pub enum ProtocolError {
    /// The server answered with a non-200 status.
    ///
    /// The body is kept verbatim (possibly truncated) since Salt API may
    /// answer with HTML even when JSON was requested.
    Status { status: u16, body: Option<String> },

    /// A 200 response whose body does not match the expected envelope.
    Malformed { reason: String },
}

impl ProtocolError {
    /// Create a status error, keeping at most a bounded prefix of the body.
    pub fn status_error(status: u16, body: Option<&[u8]>) -> Self {
        let body = body.map(|bytes| {
            let text = String::from_utf8_lossy(bytes);
            if text.chars().count() > MAX_BODY_CHARS {
                let mut truncated: String = text.chars().take(MAX_BODY_CHARS).collect();
                truncated.push_str("...");
                truncated
            } else {
                text.into_owned()
            }
        });
        ProtocolError::Status { status, body }
    }

    /// Create a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProtocolError::Malformed {
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code, if this is a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProtocolError::Status { status, .. } => Some(*status),
            ProtocolError::Malformed { .. } => None,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Status { status, body } => {
                write!(f, "Salt API failed with code {}", status)?;
                if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
                    write!(f, ": {}", body)?;
                }
                Ok(())
            }
            ProtocolError::Malformed { reason } => {
                write!(f, "malformed Salt API response: {}", reason)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid Salt API address.
    #[error("invalid Salt API address '{value}': {reason}")]
    Address { value: String, reason: String },

    /// Invalid endpoint path.
    #[error("invalid endpoint '{value}': {reason}")]
    Endpoint { value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_embeds_code_and_body() {
        let err = ProtocolError::status_error(500, Some(b"<html>oops</html>"));
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("<html>oops</html>"));
    }

    #[test]
    fn status_error_without_body() {
        let err = ProtocolError::status_error(503, None);
        assert_eq!(err.to_string(), "Salt API failed with code 503");
    }

    #[test]
    fn status_error_truncates_huge_bodies() {
        let body = "x".repeat(MAX_BODY_CHARS * 2);
        let err = ProtocolError::status_error(502, Some(body.as_bytes()));
        match err {
            ProtocolError::Status { body: Some(b), .. } => {
                assert_eq!(b.len(), MAX_BODY_CHARS + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn login_error_reports_inner_status() {
        let inner = Error::protocol("/login", ProtocolError::status_error(500, None));
        let err = Error::from(AuthError::Login {
            source: Box::new(inner),
        });
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn rejected_is_auth_with_401() {
        let err = Error::from(AuthError::Rejected {
            endpoint: "/".to_string(),
        });
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(401));
    }
}
