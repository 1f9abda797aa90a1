mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI, initialize logging for the chosen mode, and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("clipsplit error: {:#}", err);
        std::process::exit(1);
    }
}
