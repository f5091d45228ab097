use std::path::{Path, PathBuf};

use async_trait::async_trait;
use casework_core::Severity;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::CollaboratorError;
use crate::providers::json_lines::append_line;
use crate::traits::EscalationGateway;

/// Records escalations as JSON lines for the support desk to pick up.
#[derive(Debug)]
pub struct JsonLinesEscalationGateway {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesEscalationGateway {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EscalationGateway for JsonLinesEscalationGateway {
    async fn escalate(
        &self,
        case_id: &str,
        severity: Severity,
    ) -> Result<String, CollaboratorError> {
        let ticket_id = format!("TICKET-{}", Uuid::new_v4());
        let line = json!({
            "ticketId": ticket_id,
            "caseId": case_id,
            "severity": severity,
            "openedAt": Utc::now(),
        });

        let _guard = self.write_lock.lock().await;
        append_line(&self.path, &line).await?;
        info!(case_id, %severity, %ticket_id, "support ticket opened");
        Ok(ticket_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[tokio::test]
    async fn returns_ticket_and_records_it() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let gateway = JsonLinesEscalationGateway::new(dir.path().join("escalations.jsonl"));

        let ticket = gateway.escalate("C-9", Severity::Critica).await?;

        assert!(ticket.starts_with("TICKET-"));
        let line: Value = serde_json::from_str(
            std::fs::read_to_string(gateway.path())?
                .lines()
                .next()
                .unwrap_or_default(),
        )?;
        assert_eq!(line["ticketId"], ticket.as_str());
        assert_eq!(line["caseId"], "C-9");
        assert_eq!(line["severity"], "CRITICA");
        Ok(())
    }

    #[tokio::test]
    async fn every_escalation_gets_a_fresh_ticket() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let gateway = JsonLinesEscalationGateway::new(dir.path().join("escalations.jsonl"));

        let first = gateway.escalate("C-1", Severity::Alta).await?;
        let second = gateway.escalate("C-1", Severity::Alta).await?;

        assert_ne!(first, second);
        Ok(())
    }
}
