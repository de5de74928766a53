//! Draft reconciliation engine for multi-step permit request wizards

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod draft;
pub mod error;
pub mod reconcile;
pub mod submit;
pub mod wizard;

pub use error::{AttachmentRejected, DraftError, SubResourceError, SubmissionError, ValidationError};
