//! Salt API endpoint definitions and request/response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Names
// ============================================================================

/// Session creation, the only unauthenticated endpoint.
pub const LOGIN: &str = "/login";

/// Command execution.
pub const RUN: &str = "/";

/// External authentication backend used by MetalK8s.
pub const KUBERNETES_RBAC: &str = "kubernetes_rbac";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for `/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub eauth: &'a str,
    pub username: &'a str,
    pub token: &'a str,
    pub token_type: &'a str,
}

/// Nested object of a `/login` response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expire: f64,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub eauth: Option<String>,
    #[serde(default)]
    pub perms: Vec<serde_json::Value>,
}

/// A command executed through the `local` client (or another one).
///
/// # Example
///
/// ```
/// use salt_api::LocalCommand;
///
/// let ping = LocalCommand::new("*", "test.ping");
/// let json = serde_json::to_value(&ping).unwrap();
/// assert_eq!(json, serde_json::json!({"client": "local", "tgt": "*", "fun": "test.ping"}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalCommand {
    pub client: String,
    pub tgt: String,
    pub fun: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arg: Vec<String>,
}

impl LocalCommand {
    /// Run `fun` on the minions matched by `tgt` through the `local` client.
    pub fn new(tgt: impl Into<String>, fun: impl Into<String>) -> Self {
        Self {
            client: "local".to_string(),
            tgt: tgt.into(),
            fun: fun.into(),
            arg: Vec::new(),
        }
    }

    /// Use another Salt client (`runner`, `local_async`, ...).
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    /// Append positional arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg.extend(args.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_request_shape() {
        let request = LoginRequest {
            eauth: KUBERNETES_RBAC,
            username: "admin",
            token: "t0k3n",
            token_type: "Bearer",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "eauth": "kubernetes_rbac",
                "username": "admin",
                "token": "t0k3n",
                "token_type": "Bearer"
            })
        );
    }

    #[test]
    fn login_response_optional_fields() {
        let response: LoginResponse =
            serde_json::from_value(json!({"token": "abc", "expire": 1999999999})).unwrap();
        assert_eq!(response.token, "abc");
        assert_eq!(response.expire, 1999999999.0);
        assert!(response.user.is_none());
        assert!(response.perms.is_empty());
    }

    #[test]
    fn command_with_args() {
        let cmd = LocalCommand::new("bootstrap", "state.sls")
            .with_client("local_async")
            .with_args(["metalk8s.roles.etcd"]);
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "client": "local_async",
                "tgt": "bootstrap",
                "fun": "state.sls",
                "arg": ["metalk8s.roles.etcd"]
            })
        );
    }
}
