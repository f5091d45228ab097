use casework_core::ActionType;
use thiserror::Error;

/// Contract violations that abort a compensation run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SagaError {
    #[error("malformed ledger: sequence index {index} appears more than once")]
    DuplicateSequenceIndex { index: u64 },

    #[error("malformed ledger: sequence index {index} follows {previous}")]
    OutOfOrderSequenceIndex { previous: u64, index: u64 },

    #[error("compensation walk was interrupted before reaching the first record")]
    WalkInterrupted(#[source] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("handler for '{action_type}' has an empty reversal tag")]
    EmptyTag { action_type: ActionType },

    #[error("handler for '{action_type}' uses reserved tag '{tag}'")]
    ReservedTag { action_type: ActionType, tag: String },
}
