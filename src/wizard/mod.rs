//! Wizard steps, their validators and the step state machine

pub mod rules;
pub mod state_machine;
pub mod validation;

pub use rules::{BusinessRules, Lookups, RuleId};
pub use state_machine::{StepStatus, WizardStateMachine, auto_commit};
pub use validation::{
    StepOutcome, check_step, validate_advertisement, validate_attachments, validate_details, validate_for_submission,
    validate_partner, validate_step, validate_sub_form,
};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::draft::ChildKind;

/// One page of a request wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Details,
    Partners,
    Advertisements,
    Attachments,
    Review,
}

impl WizardStep {
    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::Details => "Request Details",
            WizardStep::Partners => "Partners",
            WizardStep::Advertisements => "Advertisements",
            WizardStep::Attachments => "Attachments",
            WizardStep::Review => "Review",
        }
    }

    /// The child collection whose sub-form lives on this step
    pub fn child_kind(&self) -> Option<ChildKind> {
        match self {
            WizardStep::Partners => Some(ChildKind::Partner),
            WizardStep::Advertisements => Some(ChildKind::Advertisement),
            _ => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
