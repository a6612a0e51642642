mod bootstrap_helpers;
mod cli_args;
mod orchestrator_commands;

use anyhow::Result;
use clap::Parser;
use weave_gateway::run_weave_gateway_server;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::orchestrator_commands::run_weave_command;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let mut cli = Cli::parse();
    if let Some(command) = cli.command.take() {
        return run_weave_command(command, &cli.into_gateway_config()).await;
    }
    run_weave_gateway_server(cli.into_gateway_config()).await
}
