use anyhow::Result;
use clap::Parser;
use log::info;

use permit_wizard::cli::commands::ConfigSubcommands;
use permit_wizard::cli::{Cli, Commands};
use permit_wizard::commands;
use permit_wizard::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("permit-wizard.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting permit-wizard");

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::get_config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Validate(args) => commands::validate_command(&config, args).await,
        Commands::Plan(args) => commands::plan_command(&config, args).await,
        Commands::Submit(args) => commands::submit_command(&config, args).await,
        Commands::Config(config_commands) => match config_commands.command {
            ConfigSubcommands::Show => commands::show_command(&config).await,
            ConfigSubcommands::Path => commands::path_command(&config_path).await,
            ConfigSubcommands::Init { force } => commands::init_command(config_path, force).await,
        },
    }
}
