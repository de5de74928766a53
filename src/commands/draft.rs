use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use log::info;
use std::path::Path;
use std::sync::Arc;

use super::manifest::DraftManifest;
use crate::api::Services;
use crate::cli::commands::{DraftArgs, PlanArgs, SubmitArgs};
use crate::config::Config;
use crate::draft::{DraftLoader, WizardDraft};
use crate::error::SubmissionError;
use crate::reconcile::plan;
use crate::submit::{LogNotifier, Notifier, SubmissionOrchestrator, SubmissionReport};
use crate::wizard::{BusinessRules, check_step, validate_for_submission};

/// Prints submission outcomes to the terminal and the log
#[derive(Default)]
struct ConsoleNotifier {
    log: LogNotifier,
}

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        self.log.success(message);
        println!("{} {}", "✓".bright_green().bold(), message.bright_green());
    }

    fn warning(&self, message: &str) {
        self.log.warning(message);
        println!("{} {}", "⚠".bright_yellow().bold(), message.bright_yellow());
    }

    fn error(&self, message: &str) {
        self.log.error(message);
        println!("{} {}", "✗".bright_red().bold(), message.bright_red());
    }
}

struct Session {
    services: Services,
    rules: BusinessRules,
    draft: WizardDraft,
}

async fn open_session(config: &Config, args: &DraftArgs) -> Result<Session> {
    let manifest = DraftManifest::from_path(&args.manifest)?;
    let base_dir = args.manifest.parent().unwrap_or(Path::new("."));

    let client = Arc::new(config.portal_client().context("Failed to create portal client")?);
    let services = Services::from_backend(client);
    let rules = config.business_rules(Local::now().date_naive())?;
    let loader = DraftLoader::new(services.clone(), config.upload_policy());

    let draft = manifest.build(&loader, base_dir, &rules).await?;
    Ok(Session { services, rules, draft })
}

/// Check every step of a manifest's draft and report the first problem of each
pub async fn validate_command(config: &Config, args: DraftArgs) -> Result<()> {
    info!("Validating draft manifest: {}", args.manifest.display());
    let session = open_session(config, &args).await?;
    let draft = &session.draft;

    println!("{} {}", "Draft:".bright_white().bold(), draft.flow.to_string().bright_cyan());
    for (index, step) in draft.flow.steps().iter().enumerate() {
        let outcome = check_step(*step, draft, &session.rules);
        match outcome.first_violation {
            None => println!("  {} {}. {}", "✓".bright_green().bold(), index + 1, step),
            Some(rule) => println!(
                "  {} {}. {}: {}",
                "✗".bright_red().bold(),
                index + 1,
                step,
                rule.to_string().bright_red()
            ),
        }
    }

    println!(
        "  {} partners, {} advertisements",
        draft.partners.len(),
        draft.advertisements.len()
    );

    match validate_for_submission(draft, &session.rules) {
        Ok(()) => println!("{} Ready to submit", "✓".bright_green().bold()),
        Err(e) => anyhow::bail!("Draft cannot be submitted: {}", e),
    }
    Ok(())
}

pub async fn plan_command(config: &Config, args: PlanArgs) -> Result<()> {
    info!("Planning draft manifest: {}", args.draft.manifest.display());
    let session = open_session(config, &args.draft).await?;
    let plan = plan(&session.draft);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if plan.is_empty() {
        println!("Nothing to submit.");
        return Ok(());
    }

    for (phase, ops) in plan.phases() {
        println!("{} ({} calls)", phase.to_string().bright_white().bold(), ops.len());
        for op in ops {
            println!("  {} {}", "→".bright_cyan(), op);
        }
    }
    println!("\nTotal calls: {}", plan.len());
    Ok(())
}

pub async fn submit_command(config: &Config, args: SubmitArgs) -> Result<()> {
    info!(
        "Submitting draft manifest: {} (draft save: {})",
        args.draft.manifest.display(),
        args.draft_save
    );
    let Session {
        services,
        rules,
        mut draft,
    } = open_session(config, &args.draft).await?;
    draft.is_draft_save = args.draft_save;

    let orchestrator = SubmissionOrchestrator::new(services, Arc::new(ConsoleNotifier::default()), rules);
    match orchestrator.submit(&draft).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(SubmissionError::Parent { source, warnings }) => {
            for warning in &warnings {
                println!("  {} {}", "⚠".bright_yellow(), warning);
            }
            Err(source.context("Request was not saved"))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &SubmissionReport) {
    for call in &report.calls {
        let marker = if call.succeeded {
            "✓".bright_green()
        } else {
            "✗".bright_red()
        };
        match call.created_id {
            Some(id) => println!("  {} {} {} → {}", marker, call.operation_type, call.target, id),
            None => println!("  {} {} {}", marker, call.operation_type, call.target),
        }
    }
}
