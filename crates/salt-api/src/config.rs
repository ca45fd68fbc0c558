//! Client configuration.

use std::time::Duration;

use crate::Result;
use crate::http::KUBERNETES_RBAC;
use crate::types::ApiUrl;

/// Environment variable overriding the Salt master address.
pub const ADDRESS_ENV: &str = "METALK8S_SALT_MASTER_ADDRESS";

/// Address used when [`ADDRESS_ENV`] is unset.
pub const DEFAULT_ADDRESS: &str = "http://salt-master";

/// Default deadline of a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default margin before token expiry at which a token is renewed.
///
/// Kept equal to the request timeout so that a token is never sent when it
/// could expire while the request is in flight.
pub const DEFAULT_EXPIRY_SKEW: Duration = DEFAULT_REQUEST_TIMEOUT;

/// Settings of a [`SaltClient`](crate::SaltClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: ApiUrl,
    pub eauth: String,
    pub request_timeout: Duration,
    pub expiry_skew: Duration,
}

impl ClientConfig {
    /// Configuration for the given address with default settings.
    pub fn new(address: ApiUrl) -> Self {
        Self {
            address,
            eauth: KUBERNETES_RBAC.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            expiry_skew: DEFAULT_EXPIRY_SKEW,
        }
    }

    /// Configuration read from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the address found in the environment is invalid.
    pub fn from_env() -> Result<Self> {
        let address = std::env::var(ADDRESS_ENV)
            .ok()
            .filter(|value| !value.is_empty());
        Self::from_address(address.as_deref())
    }

    /// Configuration for an optional address, falling back to
    /// [`DEFAULT_ADDRESS`].
    pub fn from_address(address: Option<&str>) -> Result<Self> {
        let address = ApiUrl::new(address.unwrap_or(DEFAULT_ADDRESS))?;
        Ok(Self::new(address))
    }

    /// Use another external authentication backend.
    pub fn with_eauth(mut self, eauth: impl Into<String>) -> Self {
        self.eauth = eauth.into();
        self
    }

    /// Set the deadline of each request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the margin kept before token expiry.
    pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
        self.expiry_skew = skew;
        self
    }

    pub(crate) fn chrono_skew(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.expiry_skew).unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SALT_API_PORT;

    #[test]
    fn default_address() {
        let config = ClientConfig::from_address(None).unwrap();
        assert_eq!(config.address.host(), Some("salt-master"));
        assert_eq!(config.address.port(), Some(SALT_API_PORT));
        assert_eq!(config.eauth, "kubernetes_rbac");
        assert!(config.expiry_skew >= config.request_timeout);
    }

    #[test]
    fn custom_address_and_settings() {
        let config = ClientConfig::from_address(Some("https://10.200.0.1"))
            .unwrap()
            .with_eauth("pam")
            .with_request_timeout(Duration::from_secs(3))
            .with_expiry_skew(Duration::from_secs(5));
        assert_eq!(config.address.as_str(), "https://10.200.0.1:4507/");
        assert_eq!(config.eauth, "pam");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.chrono_skew(), chrono::Duration::seconds(5));
    }

    #[test]
    fn invalid_address() {
        assert!(ClientConfig::from_address(Some("not a url")).is_err());
    }
}
