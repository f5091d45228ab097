use casework_core::{Category, Severity, Strategy};
use clap::Args;
use serde::Serialize;

use crate::context::print_json;
use crate::error::Result;

#[derive(Args)]
pub(crate) struct ClassifyArgs {
    /// Failure type, e.g. TIMEOUT or ERRO_SISTEMA
    #[arg(long)]
    failure_type: String,

    /// Workflow stage where the failure happened
    #[arg(long, default_value = "")]
    stage: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyOutput {
    failure_type: String,
    stage: String,
    severity: Severity,
    category: Category,
    recoverable: bool,
    strategy: Strategy,
    requires_escalation: bool,
}

pub(crate) fn run(args: &ClassifyArgs) -> Result<()> {
    let classification = casework_triage::classify(&args.failure_type, &args.stage);

    print_json(&ClassifyOutput {
        failure_type: casework_triage::normalize_failure_type(&args.failure_type),
        stage: args.stage.clone(),
        severity: classification.severity,
        category: classification.category,
        recoverable: classification.recoverable,
        strategy: classification.strategy,
        requires_escalation: classification.requires_escalation(),
    })
}
