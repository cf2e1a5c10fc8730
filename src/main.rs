use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use swiftfx::cli::convert::ConvertArgs;
use swiftfx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List currencies supported by the configured provider
    Currencies,
    /// Convert an amount and show the recent rate history
    Convert {
        /// Amount in the source currency
        amount: String,
        /// Target currency code, e.g. USD
        #[arg(short, long)]
        to: String,
        /// Source currency code; defaults to the configured base currency
        #[arg(short, long)]
        from: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl From<Commands> for swiftfx::AppCommand {
    fn from(cmd: Commands) -> swiftfx::AppCommand {
        match cmd {
            Commands::Currencies => swiftfx::AppCommand::Currencies,
            Commands::Convert {
                amount,
                to,
                from,
                json,
            } => swiftfx::AppCommand::Convert(ConvertArgs {
                amount,
                from,
                to,
                json,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => swiftfx::cli::setup::setup_at_path(path),
            None => swiftfx::cli::setup::setup(),
        },
        Some(cmd) => swiftfx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
