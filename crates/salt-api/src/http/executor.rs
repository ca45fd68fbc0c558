//! Single POST request execution.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::TransportError;

/// Header carrying the session token on authenticated calls.
pub const X_AUTH_TOKEN: &str = "x-auth-token";

/// A POST request ready to be sent.
pub struct PostRequest<'a> {
    /// Absolute target URL.
    pub url: String,
    /// JSON-encoded body.
    pub body: Vec<u8>,
    /// Session token, for authenticated calls only.
    pub auth_token: Option<&'a str>,
    /// Deadline for the whole request.
    pub timeout: Duration,
}

impl<'a> PostRequest<'a> {
    /// Encode `payload` as the JSON body of a POST to `url`.
    pub fn json<P>(
        url: String,
        payload: &P,
        auth_token: Option<&'a str>,
        timeout: Duration,
    ) -> Result<Self, TransportError>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(|e| TransportError::Request {
            message: format!("cannot serialize POST body: {}", e),
        })?;
        Ok(Self {
            url,
            body,
            auth_token,
            timeout,
        })
    }
}

impl fmt::Debug for PostRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostRequest")
            .field("url", &self.url)
            .field("body_len", &self.body.len())
            .field("authenticated", &self.auth_token.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A response whose status has not been interpreted yet.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Body bytes. `None` only when an error body could not be read.
    pub body: Option<Vec<u8>>,
}

/// Sends POST requests to Salt API.
///
/// Implementations never interpret status codes; that is the caller's job.
#[async_trait]
pub trait Executor: Send + Sync + fmt::Debug {
    /// Send one POST request.
    async fn post(&self, request: PostRequest<'_>) -> Result<RawResponse, TransportError>;
}

/// [`Executor`] backed by a reqwest HTTP client.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    /// Create a new executor.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("salt-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Build the headers for a request.
    fn headers(auth_token: Option<&str>) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(token).map_err(|_| TransportError::Request {
                message: "session token contains invalid header characters".to_string(),
            })?;
            headers.insert(HeaderName::from_static(X_AUTH_TOKEN), value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn post(&self, request: PostRequest<'_>) -> Result<RawResponse, TransportError> {
        trace!(?request, "Sending POST");

        let headers = Self::headers(request.auth_token)?;
        let timeout = request.timeout;

        let response = self
            .client
            .post(&request.url)
            .headers(headers)
            .timeout(timeout)
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, timeout))?;

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) if status == 200 => return Err(TransportError::from_reqwest(e, timeout)),
            // Error bodies are only informative.
            Err(e) => {
                debug!(status, error = %e, "Could not read error body");
                None
            }
        };

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_without_token() {
        let headers = HttpExecutor::headers(None).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(X_AUTH_TOKEN).is_none());
    }

    #[test]
    fn headers_with_token() {
        let headers = HttpExecutor::headers(Some("abc")).unwrap();
        assert_eq!(headers.get(X_AUTH_TOKEN).unwrap(), "abc");
    }

    #[test]
    fn invalid_token_is_request_error() {
        let err = HttpExecutor::headers(Some("bad\ntoken")).unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
    }

    #[test]
    fn debug_hides_token() {
        let request = PostRequest::json(
            "http://salt-master:4507/".to_string(),
            &serde_json::json!({"fun": "test.ping"}),
            Some("secret"),
            Duration::from_secs(1),
        )
        .unwrap();
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("authenticated: true"));
    }
}
