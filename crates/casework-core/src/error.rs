use thiserror::Error;

use crate::state::RecoveryState;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("illegal recovery transition {from} -> {to}")]
    IllegalTransition {
        from: RecoveryState,
        to: RecoveryState,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
