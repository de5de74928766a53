pub mod config;
pub mod draft;
pub mod manifest;

pub use config::{init_command, path_command, show_command};
pub use draft::{plan_command, submit_command, validate_command};
pub use manifest::DraftManifest;
