//! Authenticated Salt API client.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::auth::{Credential, Token, TokenSlot};
use crate::config::ClientConfig;
use crate::error::{AuthError, Error, InvalidInputError};
use crate::http::{
    Executor, HttpExecutor, LOGIN, LocalCommand, LoginRequest, LoginResponse, PostRequest, RUN,
    RawResponse, decode, decode_envelope,
};
use crate::observer::{RequestObserver, RequestRecord, TracingObserver};
use crate::policy::{AuthRetry, Step};

/// Summary of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    /// User the session belongs to, as reported by Salt API.
    pub user: String,
    /// Instant at which the session token expires.
    pub expires_at: DateTime<Utc>,
    /// Permissions granted to the session.
    pub perms: Vec<Value>,
}

/// A Salt API client.
///
/// The client owns a session token obtained from the credential it was
/// built with. The token is fetched lazily on the first call, renewed when
/// it is about to expire, and renewed once more when the server rejects it.
///
/// # Thread Safety
///
/// Clients are cheap to clone (they use internal `Arc`) and clones share
/// the same session token. Requests are sent in parallel; only token
/// renewal is serialized.
///
/// # Example
///
/// ```no_run
/// use salt_api::{Credential, SaltClient};
///
/// # async fn example() -> Result<(), salt_api::Error> {
/// let creds = Credential::bearer("storage-operator", "service-account-token");
/// let client = SaltClient::from_env(creds)?;
///
/// let minions = client.test_ping().await?;
/// for (minion, answer) in minions {
///     println!("{}: {}", minion, answer);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SaltClient {
    config: Arc<ClientConfig>,
    credential: Arc<Credential>,
    tokens: Arc<TokenSlot>,
    executor: Arc<dyn Executor>,
    observer: Arc<dyn RequestObserver>,
}

impl SaltClient {
    /// Create a client sending requests over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig, credential: Credential) -> Result<Self> {
        let executor = HttpExecutor::new().map_err(|e| Error::transport(LOGIN, e))?;
        Ok(Self::with_executor(config, credential, Arc::new(executor)))
    }

    /// Create a client for the address found in the environment.
    pub fn from_env(credential: Credential) -> Result<Self> {
        Self::new(ClientConfig::from_env()?, credential)
    }

    /// Create a client sending requests through `executor`.
    pub fn with_executor(
        config: ClientConfig,
        credential: Credential,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credential: Arc::new(credential),
            tokens: Arc::new(TokenSlot::new()),
            executor,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Report every request to `observer` instead of the tracing log.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the credential used to log in.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Returns a copy of the current session token, if any.
    pub async fn current_token(&self) -> Option<Token> {
        self.tokens.current().await.map(|token| Token::clone(&token))
    }

    /// Reuse a token obtained earlier, e.g. by another process.
    ///
    /// The caller is responsible for the token belonging to this client's
    /// credential; a stale token is simply replaced on first use.
    pub async fn restore_token(&self, token: Token) {
        self.tokens.replace(token).await;
    }

    /// Log in, replacing the current session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Login`] if the login endpoint fails; the client
    /// is then left without a token.
    #[instrument(skip(self), fields(address = %self.config.address))]
    pub async fn authenticate(&self) -> Result<LoginOutput> {
        let _gate = self.tokens.lock_gate().await;
        let (_, output) = self.login().await?;
        Ok(output)
    }

    /// Send an authenticated request and return the payload of the response.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - API path starting with `/`
    /// * `payload` - Request body, encoded as JSON
    #[instrument(skip(self, payload), fields(address = %self.config.address))]
    pub async fn call<P>(&self, endpoint: &str, payload: &P) -> Result<Map<String, Value>>
    where
        P: Serialize + ?Sized,
    {
        let response = self.authenticated_post(endpoint, payload).await?;
        decode_envelope(response).map_err(|e| Error::protocol(endpoint, e))
    }

    /// Send an authenticated request and decode the response payload into `T`.
    #[instrument(skip(self, payload), fields(address = %self.config.address))]
    pub async fn call_as<T, P>(&self, endpoint: &str, payload: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let response = self.authenticated_post(endpoint, payload).await?;
        decode(response).map_err(|e| Error::protocol(endpoint, e))
    }

    /// Execute a command and return the answer of each targeted minion.
    pub async fn run(&self, command: &LocalCommand) -> Result<Map<String, Value>> {
        debug!(fun = %command.fun, tgt = %command.tgt, "Running command");
        self.call(RUN, command).await
    }

    /// Ping every minion.
    pub async fn test_ping(&self) -> Result<Map<String, Value>> {
        self.run(&LocalCommand::new("*", "test.ping")).await
    }

    /// Send `payload` with a valid token, logging in again once if the
    /// server rejects it.
    async fn authenticated_post<P>(&self, endpoint: &str, payload: &P) -> Result<RawResponse>
    where
        P: Serialize + ?Sized,
    {
        if !endpoint.starts_with('/') {
            return Err(InvalidInputError::Endpoint {
                value: endpoint.to_string(),
                reason: "must start with '/'".to_string(),
            }
            .into());
        }

        let mut policy = AuthRetry::new();
        let mut token = self.valid_token().await?;

        loop {
            let response = self.post(endpoint, payload, Some(&*token)).await?;
            match policy.on_status(response.status) {
                Step::Accept => return Ok(response),
                Step::Reauthenticate => {
                    // Salt API forgets its tokens when restarted.
                    warn!(
                        endpoint,
                        attempt = policy.attempt(),
                        "Valid token rejected, re-authenticating"
                    );
                    self.tokens.invalidate_if(&token).await;
                    token = self.valid_token().await?;
                }
                Step::GiveUp => {
                    return Err(AuthError::Rejected {
                        endpoint: endpoint.to_string(),
                    }
                    .into());
                }
            }
        }
    }

    /// Returns the current token, logging in if it is missing or expired.
    async fn valid_token(&self) -> Result<Arc<Token>> {
        let skew = self.config.chrono_skew();
        if let Some(token) = self.tokens.valid(Utc::now(), skew).await {
            return Ok(token);
        }

        let _gate = self.tokens.lock_gate().await;
        // Another call may have logged in while we waited.
        if let Some(token) = self.tokens.valid(Utc::now(), skew).await {
            debug!("Using token obtained by a concurrent call");
            return Ok(token);
        }

        let (token, _) = self.login().await?;
        Ok(token)
    }

    /// Obtain and install a new session token. Callers hold the gate.
    #[instrument(skip(self), fields(username = %self.credential.username(), kind = %self.credential.kind()))]
    async fn login(&self) -> Result<(Arc<Token>, LoginOutput)> {
        info!("Authenticating against Salt API");

        let request = LoginRequest {
            eauth: &self.config.eauth,
            username: self.credential.username(),
            token: self.credential.token(),
            token_type: self.credential.kind(),
        };

        let result = async {
            let response = self.post(LOGIN, &request, None).await?;
            let login: LoginResponse = decode(response).map_err(|e| Error::protocol(LOGIN, e))?;
            let token = Token::from_epoch(login.token, login.expire)
                .map_err(|e| Error::protocol(LOGIN, e))?;
            Ok::<_, Error>((token, login.user, login.perms))
        }
        .await;

        let (token, user, perms) = match result {
            Ok(parts) => parts,
            Err(e) => {
                self.tokens.invalidate().await;
                return Err(AuthError::Login {
                    source: Box::new(e),
                }
                .into());
            }
        };

        let output = LoginOutput {
            user: user.unwrap_or_else(|| self.credential.username().to_string()),
            expires_at: token.expires_at(),
            perms,
        };
        let token = self.tokens.replace(token).await;

        debug!(expires_at = %output.expires_at, "Authenticated successfully");
        Ok((token, output))
    }

    /// Send one POST and report it to the observer.
    async fn post<P>(&self, endpoint: &str, payload: &P, token: Option<&Token>) -> Result<RawResponse>
    where
        P: Serialize + ?Sized,
    {
        let url = self.config.address.endpoint_url(endpoint);
        let request = PostRequest::json(
            url.clone(),
            payload,
            token.map(Token::as_str),
            self.config.request_timeout,
        )
        .map_err(|e| Error::transport(endpoint, e))?;

        let start = Instant::now();
        let result = self.executor.post(request).await;

        self.observer.on_request(&RequestRecord {
            verb: "POST",
            url,
            endpoint: endpoint.to_string(),
            status: result.as_ref().ok().map(|response| response.status),
            elapsed: start.elapsed(),
        });

        result.map_err(|e| Error::transport(endpoint, e))
    }
}

// Custom Debug impl that hides sensitive data
impl fmt::Debug for SaltClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltClient")
            .field("address", &self.config.address)
            .field("credential", &self.credential)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
