mod classify;
mod compensate;
mod handle_failure;

use casework_operations::CaseworkConfig;
use clap::Subcommand;

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Classify a failure type and show the recovery strategy it selects
    Classify(classify::ClassifyArgs),
    /// Undo the actions recorded in a ledger file, newest first
    Compensate(compensate::CompensateArgs),
    /// Classify a failure, run its recovery and record the RCA
    HandleFailure(handle_failure::HandleFailureArgs),
}

impl Commands {
    pub(crate) async fn execute(self, config: &CaseworkConfig) -> Result<()> {
        match self {
            Self::Classify(args) => classify::run(&args),
            Self::Compensate(args) => compensate::run(args, config).await,
            Self::HandleFailure(args) => handle_failure::run(args, config).await,
        }
    }
}
