mod compensate;
mod handle_failure;
mod persistence;
mod register_rca;

pub use compensate::{CompensateOperation, CompensateRequest, CompensateResponse};
pub use handle_failure::{FailureReport, HandleFailureOperation, HandleFailureRequest};
pub use register_rca::{RegisterRcaOperation, RegisterRcaRequest, RegisterRcaResponse};
