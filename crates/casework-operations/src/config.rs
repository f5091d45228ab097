use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "casework.toml";

/// Settings read from `casework.toml`. Every field has a default, so an
/// absent file or section is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaseworkConfig {
    pub compensation: CompensationSettings,
    pub recovery: RecoverySettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl CaseworkConfig {
    /// Load the configuration at `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompensationSettings {
    pub handler_timeout_ms: u64,
}

impl Default for CompensationSettings {
    fn default() -> Self {
        Self {
            handler_timeout_ms: 5_000,
        }
    }
}

impl CompensationSettings {
    #[must_use]
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecoverySettings {
    pub retry_delay_secs: u64,
    /// Attempts made to persist an audit record before giving up.
    pub audit_attempts: u32,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            retry_delay_secs: 300,
            audit_attempts: 3,
        }
    }
}

impl RecoverySettings {
    #[must_use]
    pub fn retry_delay(&self) -> TimeDelta {
        let secs = i64::try_from(self.retry_delay_secs).unwrap_or(i64::MAX);
        TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX)
    }

    /// At least one attempt is always made.
    #[must_use]
    pub fn audit_attempts(&self) -> u32 {
        self.audit_attempts.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    pub audit_dir: PathBuf,
    pub outbox_file: PathBuf,
    pub escalation_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            audit_dir: PathBuf::from(".casework/audit"),
            outbox_file: PathBuf::from(".casework/outbox.jsonl"),
            escalation_file: PathBuf::from(".casework/escalations.jsonl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
