//! Saga-style compensation for case workflows.
//!
//! A workflow instance appends every business action it applies to an
//! [`ActionLedger`]. When a later step fails, the sealed [`LedgerSnapshot`] is
//! handed to a [`CompensationCoordinator`], which walks it from the newest
//! record to the oldest and invokes the handler registered for each action
//! type. A failed or missing handler is recorded and the walk continues.

mod audit;
mod coordinator;
mod error;
mod handler;
mod ledger;
mod outcome;
mod registry;

pub use audit::{CompensationAuditLog, CompensationStep, StepStatus};
pub use coordinator::CompensationCoordinator;
pub use error::{RegistryError, SagaError};
pub use handler::{CompensationHandler, HandlerError};
pub use ledger::{ActionLedger, LedgerSnapshot};
pub use outcome::RecoveryOutcome;
pub use registry::HandlerRegistry;
