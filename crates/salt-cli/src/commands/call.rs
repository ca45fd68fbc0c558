//! Call command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use salt_api::LocalCommand;

use crate::cli::ConnectionArgs;
use crate::output;

use super::Connection;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Salt function to execute (e.g. `grains.items`)
    pub fun: String,

    /// Target expression
    #[arg(long, default_value = "*")]
    pub tgt: String,

    /// Salt client (`local`, `local_async`, `runner`, ...)
    #[arg(long, default_value = "local")]
    pub client: String,

    /// Positional argument passed to the function (repeatable)
    #[arg(long = "arg", value_name = "ARG")]
    pub args: Vec<String>,

    /// API endpoint
    #[arg(long, default_value = "/")]
    pub endpoint: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(conn: &ConnectionArgs, args: CallArgs) -> Result<()> {
    let connection = Connection::open(conn).await?;

    let command = LocalCommand::new(&args.tgt, &args.fun)
        .with_client(&args.client)
        .with_args(&args.args);

    let result = connection
        .client
        .call(&args.endpoint, &command)
        .await
        .with_context(|| format!("Failed to call {}", args.fun))?;

    connection.persist().await?;

    output::json(&Value::Object(result), args.pretty)
}
