pub mod cli;
pub mod core;
pub mod orchestrator;
pub mod providers;

use crate::cli::convert::ConvertArgs;
use crate::core::config::AppConfig;
use crate::orchestrator::ConversionOrchestrator;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Currencies,
    Convert(ConvertArgs),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("SwiftFX starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::from_config(&config)?;
    let orchestrator =
        ConversionOrchestrator::start(provider, config.history, config.base_currency.as_deref());

    match command {
        AppCommand::Currencies => cli::currencies::run(&orchestrator).await,
        AppCommand::Convert(args) => cli::convert::run(&orchestrator, args).await,
    }
}
