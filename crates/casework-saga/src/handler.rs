use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use casework_core::ActionRecord;
use thiserror::Error;

/// Reverses one kind of applied business action.
///
/// Handlers talk to external systems and are invoked with at-least-once
/// semantics: compensating an action that was already reversed must succeed
/// as a no-op rather than fail.
#[async_trait]
pub trait CompensationHandler: Send + Sync {
    /// Tag recorded in the outcome when the reversal succeeds,
    /// e.g. `PAGAMENTO_LIBERADO`.
    fn reversed_tag(&self) -> &str;

    /// Human-readable description of what the reversal does.
    fn compensation_description(&self) -> String {
        format!("produce {}", self.reversed_tag())
    }

    /// Undo the effect described by `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if the external system rejects or cannot perform the
    /// reversal.
    async fn compensate(&self, record: &ActionRecord) -> Result<(), HandlerError>;
}

/// Why a single handler invocation did not reverse its action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("missing correlation metadata '{key}'")]
    MissingMetadata { key: String },

    #[error("{0}")]
    Failed(String),

    #[error("handler did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("handler panicked")]
    Panicked,

    #[error("handler task was cancelled by the runtime")]
    Interrupted,
}

impl HandlerError {
    pub fn failed(reason: impl Display) -> Self {
        Self::Failed(reason.to_string())
    }

    /// Look up a required metadata value on `record`.
    ///
    /// # Errors
    ///
    /// Returns `HandlerError::MissingMetadata` if the key is absent or blank.
    pub fn require<'a>(record: &'a ActionRecord, key: &str) -> Result<&'a str, Self> {
        match record.metadata.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(Self::MissingMetadata {
                key: key.to_string(),
            }),
        }
    }
}
