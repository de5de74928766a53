//! Step navigation with sub-form auto-commit
//!
//! Steps are numbered from 1. Leaving a step that owns a child sub-form folds
//! a filled sub-form into its collection first; only `next()` is gated on the
//! current step being valid.

use log::{debug, info};
use std::collections::BTreeSet;

use super::WizardStep;
use super::rules::BusinessRules;
use super::validation::{validate_step, validate_sub_form};
use crate::draft::{ChildKind, LocalKey, RequestFlow, WizardDraft};
use crate::error::ValidationError;

/// Breadcrumb entry for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    pub number: usize,
    pub step: WizardStep,
    pub is_current: bool,
    pub visited: bool,
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct WizardStateMachine {
    flow: RequestFlow,
    current: usize,
    visited: BTreeSet<WizardStep>,
}

impl WizardStateMachine {
    pub fn new(flow: RequestFlow) -> Self {
        let mut visited = BTreeSet::new();
        visited.insert(WizardStep::Details);
        Self {
            flow,
            current: 1,
            visited,
        }
    }

    pub fn flow(&self) -> RequestFlow {
        self.flow
    }

    /// 1-based index of the current step
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> WizardStep {
        self.step_at(self.current)
    }

    pub fn total_steps(&self) -> usize {
        self.flow.steps().len()
    }

    pub fn has_visited(&self, step: WizardStep) -> bool {
        self.visited.contains(&step)
    }

    fn step_at(&self, number: usize) -> WizardStep {
        self.flow.steps()[number - 1]
    }

    pub fn next(&mut self, draft: &mut WizardDraft, rules: &BusinessRules) -> Result<WizardStep, ValidationError> {
        if self.current >= self.total_steps() {
            return Err(ValidationError::NoNextStep);
        }

        let step = self.current_step();
        auto_commit(step, draft, rules)?;
        validate_step(step, draft, rules)?;

        Ok(self.move_to(self.current + 1))
    }

    pub fn previous(&mut self, draft: &mut WizardDraft, rules: &BusinessRules) -> Result<WizardStep, ValidationError> {
        if self.current <= 1 {
            return Err(ValidationError::NoPreviousStep);
        }

        auto_commit(self.current_step(), draft, rules)?;
        Ok(self.move_to(self.current - 1))
    }

    /// Jump to any step; validity of the current step is not checked
    pub fn go_to(
        &mut self,
        number: usize,
        draft: &mut WizardDraft,
        rules: &BusinessRules,
    ) -> Result<WizardStep, ValidationError> {
        let total = self.total_steps();
        if number == 0 || number > total {
            return Err(ValidationError::StepOutOfRange {
                requested: number,
                total,
            });
        }
        if number == self.current {
            return Ok(self.current_step());
        }

        auto_commit(self.current_step(), draft, rules)?;
        Ok(self.move_to(number))
    }

    fn move_to(&mut self, number: usize) -> WizardStep {
        let from = self.current_step();
        self.current = number;
        let to = self.current_step();
        self.visited.insert(to);
        debug!("Wizard moved from {} to {} ({}/{})", from, to, number, self.total_steps());
        to
    }

    /// Completion flags for every step of the flow, in order
    pub fn completion(&self, draft: &WizardDraft, rules: &BusinessRules) -> Vec<StepStatus> {
        self.flow
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| StepStatus {
                number: index + 1,
                step: *step,
                is_current: index + 1 == self.current,
                visited: self.has_visited(*step),
                complete: self.is_complete(*step, draft, rules),
            })
            .collect()
    }

    fn is_complete(&self, step: WizardStep, draft: &WizardDraft, rules: &BusinessRules) -> bool {
        match step {
            WizardStep::Partners => {
                !draft.partners.is_empty() || (self.has_visited(step) && draft.sub_form_is_blank(ChildKind::Partner))
            }
            WizardStep::Advertisements => {
                !draft.advertisements.is_empty()
                    || (self.has_visited(step) && draft.sub_form_is_blank(ChildKind::Advertisement))
            }
            WizardStep::Review => self
                .flow
                .steps()
                .iter()
                .filter(|s| **s != WizardStep::Review)
                .all(|s| self.is_complete(*s, draft, rules)),
            _ => validate_step(step, draft, rules).is_ok(),
        }
    }
}

/// Fold the sub-form owned by `step` into its collection.
///
/// An untouched sub-form is left alone. A filled one must validate in full
/// before it is committed and cleared.
pub fn auto_commit(
    step: WizardStep,
    draft: &mut WizardDraft,
    rules: &BusinessRules,
) -> Result<Option<LocalKey>, ValidationError> {
    let Some(kind) = step.child_kind() else {
        return Ok(None);
    };
    if draft.sub_form_is_blank(kind) {
        return Ok(None);
    }

    validate_sub_form(draft, kind, rules).map_err(|rule| ValidationError::ChildIncomplete { kind, rule })?;

    let key = draft.commit_sub_form(kind);
    info!("Auto-committed {} {}", kind, key);
    Ok(Some(key))
}
