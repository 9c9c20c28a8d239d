//! Subcommand dispatch and execution.

pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::PortwardError;

pub async fn dispatch(cli: Cli) -> Result<(), PortwardError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  portward v{version} - local reverse proxies for Cloudflare Access applications\n\n  \
         No command provided. To get started:\n\n    \
         portward run -e app.example.com       Proxy one application on localhost:8888\n    \
         portward run -c proxies.yaml          Start from a config file\n    \
         portward --help                       See all commands and options\n"
    );
}
