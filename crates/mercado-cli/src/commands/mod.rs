mod backends;
mod request;

use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    match &cli.command {
        Command::Request(args) => request::run(args).await,
        Command::Backends => backends::run(),
    }
}
