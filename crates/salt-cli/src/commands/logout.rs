//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::ConnectionArgs;
use crate::output;
use crate::session::TokenCache;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(conn: &ConnectionArgs, _args: LogoutArgs) -> Result<()> {
    if conn.no_cache {
        eprintln!("{}", "Token cache disabled, nothing to remove.".dimmed());
        return Ok(());
    }

    let cache = TokenCache::open(conn.cache_dir.as_deref()).context("Failed to open token cache")?;

    if cache.clear()? {
        output::success("Session removed");
    } else {
        eprintln!("{}", "No active session.".dimmed());
    }

    Ok(())
}
