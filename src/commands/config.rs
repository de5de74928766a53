use anyhow::{Context, Result};
use colored::*;
use log::info;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Show the effective configuration as TOML
pub async fn show_command(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
    println!("{}", content);

    match config.access_token() {
        Some(_) => println!("{} {} is set", "✓".bright_green().bold(), config.api.token_env),
        None => println!("{} {} is not set", "⚠".bright_yellow().bold(), config.api.token_env),
    }
    Ok(())
}

pub async fn path_command(path: &Path) -> Result<()> {
    println!("{}", path.display());
    Ok(())
}

/// Write the defaults to the config file
///
/// # Arguments
/// * `path` - Config file location
/// * `force` - Overwrite an existing file
pub async fn init_command(path: PathBuf, force: bool) -> Result<()> {
    info!("Initializing config at {:?}", path);

    if path.exists() && !force {
        anyhow::bail!("Config file already exists: {} (use --force to overwrite)", path.display());
    }

    Config::default().save_to(&path)?;
    println!(
        "{} Config written to {}",
        "✓".bright_green().bold(),
        path.display().to_string().bright_green().bold()
    );
    Ok(())
}
