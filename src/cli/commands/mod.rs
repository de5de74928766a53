pub mod config;
pub mod draft;

pub use config::{ConfigCommands, ConfigSubcommands};
pub use draft::{DraftArgs, PlanArgs, SubmitArgs};
