use std::fs;
use std::path::Path;
use std::sync::Arc;

use casework_operations::CaseworkConfig;
use casework_operations::providers::{
    FileSystemAuditRecorder, JsonLinesEscalationGateway, JsonLinesEventPublisher,
    standard_registry,
};
use casework_saga::{CompensationCoordinator, LedgerSnapshot};

use crate::error::{CliError, Result};

/// File-system collaborators and the standard compensation catalogue, built
/// from configuration.
pub(crate) struct Context {
    pub audit: Arc<FileSystemAuditRecorder>,
    pub outbox: Arc<JsonLinesEventPublisher>,
    pub escalation: Arc<JsonLinesEscalationGateway>,
    pub coordinator: CompensationCoordinator,
}

impl Context {
    pub(crate) fn from_config(config: &CaseworkConfig) -> Result<Self> {
        let storage = &config.storage;
        let outbox = Arc::new(JsonLinesEventPublisher::new(&storage.outbox_file));
        let registry = standard_registry(outbox.clone())?;
        let coordinator = CompensationCoordinator::new(Arc::new(registry))
            .with_handler_timeout(config.compensation.handler_timeout());

        Ok(Self {
            audit: Arc::new(FileSystemAuditRecorder::new(&storage.audit_dir)),
            outbox,
            escalation: Arc::new(JsonLinesEscalationGateway::new(&storage.escalation_file)),
            coordinator,
        })
    }
}

/// Read a ledger saved as a JSON array of action records.
pub(crate) fn load_ledger(path: &Path) -> Result<LedgerSnapshot> {
    let content = fs::read_to_string(path).map_err(|source| CliError::LedgerRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::LedgerParse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{rendered}");
    Ok(())
}
