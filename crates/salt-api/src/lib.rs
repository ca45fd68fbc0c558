//! salt-api - Salt API client for Kubernetes operators.
//!
//! This library drives a Salt master through its REST API. All calls flow
//! through a [`SaltClient`], which logs in with a [`Credential`] (usually a
//! Kubernetes service-account token), keeps the resulting session [`Token`]
//! fresh and unwraps the `{"return": [...]}` envelope of every answer.
//!
//! # Example
//!
//! ```no_run
//! use salt_api::{ClientConfig, Credential, LocalCommand, SaltClient};
//!
//! # async fn example() -> Result<(), salt_api::Error> {
//! let config = ClientConfig::from_env()?;
//! let creds = Credential::bearer("storage-operator", "service-account-token");
//! let client = SaltClient::new(config, creds)?;
//!
//! let command = LocalCommand::new("node-1", "disk.blkid");
//! let result = client.run(&command).await?;
//! println!("{}", serde_json::Value::Object(result));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod observer;
pub mod policy;
pub mod types;

mod client;

// Re-export primary types at crate root for convenience
pub use auth::{Credential, Token};
pub use client::{LoginOutput, SaltClient};
pub use config::ClientConfig;
pub use error::Error;
pub use http::LocalCommand;
pub use observer::{RequestObserver, RequestRecord};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
