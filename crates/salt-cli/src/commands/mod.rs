//! Subcommand implementations.

pub mod call;
pub mod login;
pub mod logout;
pub mod ping;

use std::time::Duration;

use anyhow::{Context, Result};

use salt_api::{ClientConfig, Credential, SaltClient};

use crate::cli::{Cli, Commands, ConnectionArgs};
use crate::session::TokenCache;

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login(args) => login::run(&cli.connection, args).await,
        Commands::Logout(args) => logout::run(&cli.connection, args).await,
        Commands::Ping(args) => ping::run(&cli.connection, args).await,
        Commands::Call(args) => call::run(&cli.connection, args).await,
    }
}

/// A client together with the cache its session token lives in.
pub struct Connection {
    pub client: SaltClient,
    cache: Option<TokenCache>,
}

impl Connection {
    /// Build a client from the command line, reusing a cached token when
    /// one exists for the same address and username.
    pub async fn open(args: &ConnectionArgs) -> Result<Self> {
        let config = ClientConfig::from_address(args.address.as_deref())
            .context("Invalid Salt API address")?
            .with_eauth(&args.eauth)
            .with_request_timeout(Duration::from_secs(args.timeout));

        let username = args
            .username
            .as_deref()
            .context("Missing --username (or SALT_API_USERNAME)")?;
        let token = args
            .token
            .as_deref()
            .context("Missing --token (or SALT_API_TOKEN)")?;
        let credential = Credential::new(username, token, &args.token_type);

        let client =
            SaltClient::new(config, credential).context("Failed to create Salt API client")?;

        let cache = if args.no_cache {
            None
        } else {
            Some(TokenCache::open(args.cache_dir.as_deref()).context("Failed to open token cache")?)
        };

        let connection = Self { client, cache };
        if let Some(cache) = &connection.cache
            && let Some(token) = cache.load(connection.address(), username)?
        {
            tracing::debug!(expires_at = %token.expires_at(), "Reusing cached session token");
            connection.client.restore_token(token).await;
        }

        Ok(connection)
    }

    /// Save the current session token for later invocations.
    pub async fn persist(&self) -> Result<()> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        if let Some(token) = self.client.current_token().await {
            cache
                .save(self.address(), self.client.credential().username(), &token)
                .context("Failed to save session")?;
        }
        Ok(())
    }

    fn address(&self) -> &str {
        self.client.config().address.as_str()
    }
}
