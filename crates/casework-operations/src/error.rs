use std::path::PathBuf;

use casework_core::CoreError;
use casework_saga::{RegistryError, SagaError};
use thiserror::Error;

/// Fatal errors: contract violations and unusable configuration.
///
/// Failures of external collaborators are never returned through this type;
/// operations capture them in a [`crate::CollaboratorStatus`].
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Saga(#[from] SagaError),

    #[error("failed to build compensation handler registry")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    IllegalTransition(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure reported by an audit store, event bus or escalation gateway.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("I/O error on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode record")]
    Encode(#[from] serde_json::Error),

    #[error("invalid record key '{0}'")]
    InvalidKey(String),

    #[error("{0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, OperationError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use casework_core::RecoveryState;

    use super::*;

    #[test]
    fn illegal_transition_is_transparent() {
        let err = OperationError::from(CoreError::IllegalTransition {
            from: RecoveryState::Closed,
            to: RecoveryState::New,
        });

        assert_eq!(err.to_string(), "illegal recovery transition CLOSED -> NEW");
    }

    #[test]
    fn config_parse_error_keeps_source() {
        let source = toml::from_str::<toml::Table>("= broken").expect_err("invalid toml");
        let err = ConfigError::Parse {
            path: PathBuf::from("casework.toml"),
            source,
        };

        assert!(err.to_string().contains("casework.toml"));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_error_names_path() {
        let err = CollaboratorError::Io {
            path: PathBuf::from("/tmp/outbox.jsonl"),
            source: std::io::Error::other("disk full"),
        };

        assert!(err.to_string().contains("/tmp/outbox.jsonl"));
    }
}
