//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{call::CallArgs, login::LoginArgs, logout::LogoutArgs, ping::PingArgs};

/// Salt API CLI tool.
#[derive(Parser, Debug)]
#[command(name = "saltctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// How to reach and authenticate against Salt API.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Salt API address (port 4507 is used when none is given)
    #[arg(long, env = "METALK8S_SALT_MASTER_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Identity to log in as (e.g. a ServiceAccount name)
    #[arg(long, env = "SALT_API_USERNAME", global = true)]
    pub username: Option<String>,

    /// Externally issued token (e.g. a ServiceAccount token)
    #[arg(long, env = "SALT_API_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Kind of the external token
    #[arg(long, env = "SALT_API_TOKEN_TYPE", default_value = "Bearer", global = true)]
    pub token_type: String,

    /// External authentication backend
    #[arg(long, default_value = "kubernetes_rbac", global = true)]
    pub eauth: String,

    /// Request timeout, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 10, global = true)]
    pub timeout: u64,

    /// Directory holding the session token cache
    #[arg(long, env = "SALT_API_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Neither read nor write the session token cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new session (login)
    Login(LoginArgs),

    /// Forget the cached session
    Logout(LogoutArgs),

    /// Ping minions
    Ping(PingArgs),

    /// Execute an arbitrary Salt function
    Call(CallArgs),
}
