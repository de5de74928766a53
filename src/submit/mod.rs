//! Executing a reconciliation plan against the portal services

pub mod notify;
pub mod orchestrator;
pub mod report;

pub use notify::{LogNotifier, Notifier};
pub use orchestrator::SubmissionOrchestrator;
pub use report::{CallRecord, SubmissionReport};
