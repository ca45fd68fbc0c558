//! Ping command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use salt_api::LocalCommand;

use crate::cli::ConnectionArgs;
use crate::output;

use super::Connection;

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Target expression
    #[arg(default_value = "*")]
    pub tgt: String,
}

pub async fn run(conn: &ConnectionArgs, args: PingArgs) -> Result<()> {
    let connection = Connection::open(conn).await?;

    let command = LocalCommand::new(&args.tgt, "test.ping");
    let answers = connection
        .client
        .run(&command)
        .await
        .context("Failed to ping minions")?;

    connection.persist().await?;

    if answers.is_empty() {
        eprintln!("{}", "No minion matched.".dimmed());
        return Ok(());
    }

    let failed = answers
        .iter()
        .filter(|(name, answer)| !output::minion(name, answer))
        .count();

    if failed > 0 {
        bail!("{} minion(s) did not answer", failed);
    }

    Ok(())
}
