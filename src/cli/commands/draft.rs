use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct DraftArgs {
    /// Path to the draft manifest (TOML)
    #[arg(help = "Path to the draft manifest (TOML)")]
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub draft: DraftArgs,
    /// Save as a draft: only the details step has to be valid
    #[arg(long)]
    pub draft_save: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub draft: DraftArgs,
    /// Print the plan as JSON, payloads included
    #[arg(long)]
    pub json: bool,
}
