use std::path::PathBuf;

use casework_operations::CaseworkConfig;
use casework_operations::operations::{HandleFailureOperation, HandleFailureRequest};
use clap::Args;

use crate::context::{Context, load_ledger, print_json};
use crate::error::Result;

#[derive(Args)]
pub(crate) struct HandleFailureArgs {
    #[arg(long)]
    case_id: String,

    /// Failure type, e.g. TIMEOUT or ERRO_SISTEMA
    #[arg(long)]
    failure_type: String,

    /// Workflow stage where the failure happened
    #[arg(long)]
    stage: String,

    /// Error message reported by the failed step
    #[arg(long, default_value = "")]
    message: String,

    /// Ledger of the failed instance, compensated if the strategy requires it
    #[arg(long)]
    ledger: Option<PathBuf>,
}

pub(crate) async fn run(args: HandleFailureArgs, config: &CaseworkConfig) -> Result<()> {
    let ledger = args.ledger.as_deref().map(load_ledger).transpose()?;
    let context = Context::from_config(config)?;

    let operation = HandleFailureOperation::new(
        context.audit,
        context.outbox,
        context.escalation,
        context.coordinator,
    )
    .with_settings(config.recovery.clone());
    let report = operation
        .execute(HandleFailureRequest {
            case_id: args.case_id,
            failure_type: args.failure_type,
            error_message: args.message,
            stage: args.stage,
            ledger,
            impact: None,
        })
        .await?;

    print_json(&report)
}
