use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;
mod error_mapping;
mod services;

use cli::Cli;
use error_mapping::config_error;
use matchlog_core::{App, AppError, Config};
use services::AppServices;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize core
    matchlog_core::init()?;

    // Create and initialize application
    let mut app = match load_app(cli.config.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };
    app.initialize()?;

    tracing::info!("Matchlog started");

    let services = match AppServices::init(app.config()) {
        Ok(services) => services,
        Err(e) => {
            tracing::error!("Failed to start services: {}", e);
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    let outcome = cli::run(cli.command, &services);

    // Graceful shutdown
    services.shutdown();
    app.shutdown()?;

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_app(config_path: Option<&Path>) -> Result<App, AppError> {
    match config_path {
        Some(path) => {
            let (config, _validation) = Config::load_validated_from(path).map_err(config_error)?;
            Ok(App::with_config(config))
        }
        None => App::new().map_err(config_error),
    }
}
