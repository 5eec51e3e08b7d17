mod auth;
mod cli;
mod config;
mod error;
mod output;
mod providers;
mod scheduler;
mod snapshot;
mod state;
mod target;

use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use error::DashboardError;
use log::info;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            let _ = e.print();
            return ExitCode::from(1);
        }
        Err(e) => e.exit(),
    };

    output::print_banner();
    info!("Starting Concourse Summary");

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<DashboardError>()
                .map_or(1, DashboardError::exit_code);
            eprintln!("Error: {e:#}");
            ExitCode::from(code)
        }
    }
}
