mod cli;
mod logging;
mod reporter;

use anyhow::anyhow;
use clap::Parser;
use cli::Cli;
use crccheck::{CancelToken, Coordinator};
use dotenv::dotenv;
use reporter::CliReporter;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let config = args.apply(crccheck::config::load_configuration()?);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .map_err(|e| anyhow!("Error installing Ctrl-C handler: {}", e))?;

    let coordinator = Coordinator::new(config).with_cancel_token(cancel);
    let reporter = CliReporter::new();
    coordinator.run(&reporter)?;

    Ok(())
}
