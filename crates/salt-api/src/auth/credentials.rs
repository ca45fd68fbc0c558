//! Identity credential type.

use std::fmt;

/// Token kind used for Kubernetes service-account tokens.
pub const BEARER: &str = "Bearer";

/// External identity used to obtain a Salt API session token.
///
/// The token held here is issued outside of Salt (typically a Kubernetes
/// service-account token) and is only ever forwarded to the login endpoint.
///
/// # Security
///
/// The token is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use salt_api::Credential;
///
/// let creds = Credential::bearer("storage-operator", "sa-token");
/// assert_eq!(creds.username(), "storage-operator");
/// assert_eq!(creds.kind(), "Bearer");
/// ```
#[derive(Clone)]
pub struct Credential {
    username: String,
    token: String,
    kind: String,
}

impl Credential {
    /// Create a new credential.
    ///
    /// # Arguments
    ///
    /// * `username` - The identity name (e.g. a service-account name)
    /// * `token` - The externally issued token
    /// * `kind` - How the token must be interpreted (`Bearer`, `Basic`)
    pub fn new(
        username: impl Into<String>,
        token: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            kind: kind.into(),
        }
    }

    /// Create a credential from a bearer token.
    pub fn bearer(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(username, token, BEARER)
    }

    /// Returns the identity name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the token kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the token.
    ///
    /// Use this only when constructing the login request.
    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("kind", &self.kind)
            .finish()
    }
}
