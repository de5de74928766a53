use super::commands::config::ConfigCommands;
use super::commands::draft::{DraftArgs, PlanArgs, SubmitArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "permit-wizard")]
#[command(about = "Validate, plan and submit permit request drafts")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a draft manifest step by step without contacting the save endpoints
    Validate(DraftArgs),
    /// Show the calls a submission of the draft would issue
    Plan(PlanArgs),
    /// Submit a draft manifest to the portal
    Submit(SubmitArgs),
    /// Configuration management
    Config(ConfigCommands),
}
