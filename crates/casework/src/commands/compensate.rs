use std::path::PathBuf;

use casework_operations::CaseworkConfig;
use casework_operations::operations::{CompensateOperation, CompensateRequest};
use clap::Args;
use uuid::Uuid;

use crate::context::{Context, load_ledger, print_json};
use crate::error::Result;

#[derive(Args)]
pub(crate) struct CompensateArgs {
    /// JSON file holding the ledger as an array of action records
    #[arg(long)]
    ledger: PathBuf,

    /// Why the instance is being rolled back
    #[arg(long)]
    reason: String,

    /// Workflow instance the ledger belongs to (default: a new id)
    #[arg(long)]
    instance_id: Option<String>,

    #[arg(long, default_value = "MANUAL")]
    compensation_type: String,
}

pub(crate) async fn run(args: CompensateArgs, config: &CaseworkConfig) -> Result<()> {
    let ledger = load_ledger(&args.ledger)?;
    let context = Context::from_config(config)?;

    let operation = CompensateOperation::new(context.audit, context.outbox, context.coordinator)
        .with_audit_attempts(config.recovery.audit_attempts());
    let response = operation
        .execute(CompensateRequest {
            instance_id: args
                .instance_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            compensation_type: args.compensation_type,
            reason: args.reason,
            ledger,
        })
        .await?;

    print_json(&response)
}
