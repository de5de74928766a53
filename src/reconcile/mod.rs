//! Turning a draft into the backend calls that persist it

pub mod operation;
pub mod planner;

pub use operation::{Operation, Phase};
pub use planner::{ReconciliationPlan, plan};
