//! Session token and its synchronized holder.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::error::ProtocolError;

/// A Salt API session token.
///
/// Session tokens are short-lived and obtained from the login endpoint.
/// They are distinct from the long-lived [`Credential`](super::Credential)
/// used to obtain them.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    /// Create a new token.
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Create a token from the `expire` field of a login response
    /// (fractional seconds since the Unix epoch).
    pub(crate) fn from_epoch(
        value: impl Into<String>,
        expire: f64,
    ) -> Result<Self, ProtocolError> {
        if !expire.is_finite() || expire < 0.0 {
            return Err(ProtocolError::malformed(format!(
                "invalid token expiry: {}",
                expire
            )));
        }
        let secs = expire.trunc();
        let nanos = ((expire - secs) * 1e9) as u32;
        let expires_at = DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
            .ok_or_else(|| {
                ProtocolError::malformed(format!("token expiry out of range: {}", expire))
            })?;
        Ok(Self::new(value, expires_at))
    }

    /// Returns the instant at which the server stops accepting this token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check whether the token must be considered expired at `now`, keeping
    /// `skew` as safety margin before the real expiry.
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at
            .checked_sub_signed(skew)
            .is_none_or(|deadline| now >= deadline)
    }

    /// Returns the token value for use in the `X-Auth-Token` header.
    pub(crate) fn as_str(&self) -> &str {
        &self.value
    }
}

// Hide token value in Debug output
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Holder of the current session token of a client.
///
/// Readers get a shared snapshot of an immutable [`Token`], so a token is
/// either entirely the old one or entirely the new one. Authentication is
/// serialized through a separate gate so that concurrent callers observing
/// a stale token converge on a single new one.
#[derive(Debug, Default)]
pub struct TokenSlot {
    current: RwLock<Option<Arc<Token>>>,
    gate: Mutex<()>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, if any.
    pub async fn current(&self) -> Option<Arc<Token>> {
        self.current.read().await.clone()
    }

    /// Returns the current token if it is still usable at `now`.
    pub async fn valid(&self, now: DateTime<Utc>, skew: Duration) -> Option<Arc<Token>> {
        self.current()
            .await
            .filter(|token| !token.is_expired(now, skew))
    }

    /// Install a new current token.
    pub async fn replace(&self, token: Token) -> Arc<Token> {
        let token = Arc::new(token);
        *self.current.write().await = Some(Arc::clone(&token));
        token
    }

    /// Forget the current token.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    /// Forget the current token only if it is still `rejected`.
    ///
    /// Returns `false` when another caller already replaced it.
    pub async fn invalidate_if(&self, rejected: &Arc<Token>) -> bool {
        let mut current = self.current.write().await;
        match current.as_ref() {
            Some(token) if Arc::ptr_eq(token, rejected) => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    /// Acquire the authentication gate.
    pub(crate) async fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}
