//! Compensation and failure-handling operations wired to their external
//! collaborators.
//!
//! Operations take their collaborators as explicit ports ([`traits`]);
//! [`providers`] holds the file-system implementations used by the CLI.

pub mod config;
mod error;
pub mod operations;
pub mod providers;
pub mod traits;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod mocks;

pub use config::CaseworkConfig;
pub use error::{CollaboratorError, ConfigError, OperationError, Result};
pub use types::{
    Collaborator, CollaboratorFailure, CollaboratorStatus, CustomerNotice, RecoveryAction,
};

/// Event bus topics.
pub mod topics {
    pub const COMPENSATION_EXECUTED: &str = "compensation-executed";
    pub const FAILURE_HANDLED: &str = "failure-handled";
    pub const RCA_REGISTERED: &str = "rca-registered";
    pub const COMPENSATION_COMMANDS: &str = "compensation-commands";
}

/// Audit store collections.
pub mod collections {
    pub const COMPENSATION_RUNS: &str = "compensation_runs";
    pub const FAILURE_RECORDS: &str = "failure_records";
    pub const RCA_RECORDS: &str = "rca_records";
}
