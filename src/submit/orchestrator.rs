//! Executes a reconciliation plan phase by phase
//!
//! Calls of one phase are issued together and all settle before the next
//! phase starts. A failed sub-resource call becomes a warning; a failed
//! parent call fails the submission. Calls already applied are not rolled
//! back.

use futures::future::join_all;
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::notify::Notifier;
use super::report::{CallRecord, SubmissionReport};
use crate::api::{ChildPayload, Services};
use crate::draft::{ChildKind, ParentMode, ServerId, WizardDraft};
use crate::error::{SubResourceError, SubmissionError};
use crate::reconcile::{Operation, Phase, ReconciliationPlan, plan};
use crate::wizard::{BusinessRules, validate_for_submission};

/// Clears the saving flag when a submission ends, however it ends
struct SavingGuard<'a>(&'a AtomicBool);

impl<'a> SavingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SubmissionOrchestrator {
    services: Services,
    notifier: Arc<dyn Notifier>,
    rules: BusinessRules,
    saving: AtomicBool,
}

impl SubmissionOrchestrator {
    pub fn new(services: Services, notifier: Arc<dyn Notifier>, rules: BusinessRules) -> Self {
        Self {
            services,
            notifier,
            rules,
            saving: AtomicBool::new(false),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Validate, plan and execute. The draft is left untouched so a failed
    /// submission can be retried.
    pub async fn submit(&self, draft: &WizardDraft) -> Result<SubmissionReport, SubmissionError> {
        let _guard = SavingGuard::acquire(&self.saving).ok_or_else(|| {
            warn!("Submission rejected: another submission is in progress");
            SubmissionError::AlreadySaving
        })?;

        if let Err(e) = validate_for_submission(draft, &self.rules) {
            self.notifier.error(&e.to_string());
            return Err(e.into());
        }

        let result = self.execute(plan(draft)).await;
        match &result {
            Ok(report) if report.is_clean() => self.notifier.success(&report.summary()),
            Ok(report) => {
                let details: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
                self.notifier
                    .warning(&format!("{}: {}", report.summary(), details.join("; ")));
            }
            Err(e) => self.notifier.error(&e.to_string()),
        }
        result
    }

    pub async fn execute(&self, plan: ReconciliationPlan) -> Result<SubmissionReport, SubmissionError> {
        match plan.mode {
            ParentMode::Create => self.execute_create(plan).await,
            ParentMode::Update(id) => self.execute_update(id, plan).await,
        }
    }

    /// One combined parent call, then each advertisement create in turn
    async fn execute_create(&self, plan: ReconciliationPlan) -> Result<SubmissionReport, SubmissionError> {
        let mut operations = plan.operations.into_iter();
        let parent = match operations.next() {
            Some(Operation::CreateRequest { payload }) => payload,
            _ => {
                return Err(SubmissionError::Parent {
                    source: anyhow::anyhow!("Create plan does not start with the request create"),
                    warnings: Vec::new(),
                });
            }
        };

        info!(
            "Phase {}: 1 call ({} nested partners, {} nested attachments)",
            Phase::CreatingRequest,
            parent.partners.len(),
            parent.attachments.len()
        );
        let created = match self.services.requests.create_request(&parent).await {
            Ok(created) => created,
            Err(e) => {
                error!("Request create failed: {:#}", e);
                return Err(SubmissionError::Parent {
                    source: e,
                    warnings: Vec::new(),
                });
            }
        };
        info!("Created request {} with partners {:?}", created.id, created.partner_ids);

        let parent_op = Operation::CreateRequest { payload: parent };
        let mut report = SubmissionReport {
            request_id: created.id,
            mode: ParentMode::Create,
            calls: vec![CallRecord::succeeded(&parent_op, Some(created.id))],
            warnings: Vec::new(),
        };

        for mut op in operations {
            if let Operation::CreateChild { payload } = &mut op {
                payload.set_request_id(created.id);
            }
            info!("Phase {}: {}", op.phase(), op);
            match self.run(&op).await {
                Ok(id) => report.calls.push(CallRecord::succeeded(&op, id)),
                Err(warning) => {
                    report.calls.push(CallRecord::failed(&op));
                    report.warnings.push(warning);
                }
            }
        }

        info!("{}", report.summary());
        Ok(report)
    }

    async fn execute_update(
        &self,
        request_id: ServerId,
        plan: ReconciliationPlan,
    ) -> Result<SubmissionReport, SubmissionError> {
        let mut calls = Vec::new();
        let mut warnings = Vec::new();

        for (phase, ops) in plan.phases() {
            info!("Phase {}: {} calls", phase, ops.len());

            if phase.is_parent() {
                for op in ops {
                    match self.run(op).await {
                        Ok(id) => calls.push(CallRecord::succeeded(op, id)),
                        Err(failure) => {
                            error!("{}", failure);
                            return Err(SubmissionError::Parent {
                                source: failure.source,
                                warnings,
                            });
                        }
                    }
                }
                continue;
            }

            let results = join_all(ops.iter().map(|op| self.run(op))).await;
            for (op, result) in ops.into_iter().zip(results) {
                match result {
                    Ok(id) => calls.push(CallRecord::succeeded(op, id)),
                    Err(warning) => {
                        calls.push(CallRecord::failed(op));
                        warnings.push(warning);
                    }
                }
            }
        }

        let report = SubmissionReport {
            request_id,
            mode: ParentMode::Update(request_id),
            calls,
            warnings,
        };
        info!("{}", report.summary());
        Ok(report)
    }

    /// Issue one call; the returned id is set for creates
    async fn run(&self, op: &Operation) -> Result<Option<ServerId>, SubResourceError> {
        let result: anyhow::Result<Option<ServerId>> = match op {
            Operation::DeleteAttachment { id, .. } => {
                self.services.attachments.delete_attachment(*id).await.map(|_| None)
            }
            Operation::CreateAttachment { payload, .. } => {
                self.services.attachments.create_attachment(payload).await.map(Some)
            }
            Operation::UpdateAttachment { id, payload, .. } => self
                .services
                .attachments
                .update_attachment(*id, payload)
                .await
                .map(|_| None),
            Operation::DeleteChild {
                kind: ChildKind::Partner,
                id,
            } => self.services.partners.delete_partner(*id).await.map(|_| None),
            Operation::DeleteChild {
                kind: ChildKind::Advertisement,
                id,
            } => self
                .services
                .advertisements
                .delete_advertisement(*id)
                .await
                .map(|_| None),
            Operation::CreateChild {
                payload: ChildPayload::Partner(partner),
            } => self.services.partners.create_partner(partner).await.map(Some),
            Operation::CreateChild {
                payload: ChildPayload::Advertisement(ad),
            } => self.services.advertisements.create_advertisement(ad).await.map(Some),
            Operation::UpdateAdvertisement { id, payload } => self
                .services
                .advertisements
                .update_advertisement(*id, payload)
                .await
                .map(|_| None),
            Operation::CreateRequest { payload } => self
                .services
                .requests
                .create_request(payload)
                .await
                .map(|created| Some(created.id)),
            Operation::UpdateRequest { id, payload } => self
                .services
                .requests
                .update_request(*id, payload)
                .await
                .map(|_| None),
        };

        result.map_err(|source| {
            let failure = SubResourceError {
                phase: op.phase(),
                target: op.target(),
                source,
            };
            if !op.is_parent() {
                warn!("{}", failure);
            }
            failure
        })
    }
}
