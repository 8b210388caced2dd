use std::process::ExitCode;

use clap::Parser as _;
use cli::Cli;
use kata_core::config::Config;
use tokio::{
    select,
    signal::unix::{SignalKind, signal},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod cli;
mod quote;
mod sum;
mod telemetry;
mod tokens;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("Failed to install error report handler: {err}");
        return ExitCode::FAILURE;
    }

    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    telemetry::init_subscriber(telemetry::get_subscriber());
    info!(?config, "starting with config");

    let cli = Cli::parse();
    let shutdown_token = CancellationToken::new();

    let command_jh = tokio::spawn(cli.run(config, shutdown_token.clone()));

    // Set up signal handlers for graceful shutdown
    let mut sigterm = signal(SignalKind::terminate())
        .expect("setting sigterm listener on unix should always work");
    let mut sigint = signal(SignalKind::interrupt())
        .expect("setting sigint listener on unix should always work");

    // Wait for either command completion or interrupt signal
    let result = select! {
        res = command_jh => {
            res.map(|command_result| match command_result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = ?e, "command failed");
                    ExitCode::FAILURE
                }
            })
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM signal");
            shutdown_token.cancel();
            Ok(ExitCode::FAILURE)
        }
        _ = sigint.recv() => {
            info!("received SIGINT signal");
            shutdown_token.cancel();
            Ok(ExitCode::FAILURE)
        }
    };

    match result {
        Ok(exit_code) => {
            info!("command completed");
            exit_code
        }
        Err(e) => {
            error!(%e, "command exited unexpectedly");
            ExitCode::FAILURE
        }
    }
}
