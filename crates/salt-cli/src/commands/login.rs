//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::ConnectionArgs;
use crate::output;

use super::Connection;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Also print the permissions granted to the session
    #[arg(long)]
    pub show_perms: bool,
}

pub async fn run(conn: &ConnectionArgs, args: LoginArgs) -> Result<()> {
    let connection = Connection::open(conn).await?;

    eprintln!("{}", "Logging in...".dimmed());

    let login = connection
        .client
        .authenticate()
        .await
        .context("Failed to login")?;

    connection.persist().await?;

    output::success("Logged in successfully");
    println!();
    output::field("User", &login.user);
    output::field("Address", connection.client.config().address.as_str());
    output::field("Expires", &login.expires_at.to_rfc3339());

    if args.show_perms {
        output::json(&login.perms, true)?;
    }

    Ok(())
}
