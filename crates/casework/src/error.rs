use std::path::PathBuf;

use casework_operations::{ConfigError, OperationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("operation failed")]
    Operation(#[from] OperationError),

    #[error("failed to read ledger file '{path}'")]
    LedgerRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ledger file '{path}'")]
    LedgerParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode output")]
    Output(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
