use casework_saga::{CompensationCoordinator, LedgerSnapshot, RecoveryOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::persistence::{persist_with_retries, publish_recorded, to_json};
use crate::Result;
use crate::collections::COMPENSATION_RUNS;
use crate::config::RecoverySettings;
use crate::topics::COMPENSATION_EXECUTED;
use crate::traits::{AuditRecorder, EventPublisher};
use crate::types::CollaboratorStatus;

#[derive(Debug, Clone)]
pub struct CompensateRequest {
    pub instance_id: String,
    pub compensation_type: String,
    pub reason: String,
    pub ledger: LedgerSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensateResponse {
    pub run_id: String,
    pub instance_id: String,
    pub compensation_type: String,
    pub reason: String,
    #[serde(flatten)]
    pub outcome: RecoveryOutcome,
    pub compensated_at: DateTime<Utc>,
    pub collaborators: CollaboratorStatus,
}

impl CompensateResponse {
    #[must_use]
    pub fn compensation_complete(&self) -> bool {
        self.outcome.compensation_complete()
    }

    #[must_use]
    pub fn compensated_actions(&self) -> &[String] {
        self.outcome.compensated_actions()
    }
}

pub struct CompensateOperation<A, E> {
    audit: A,
    events: E,
    coordinator: CompensationCoordinator,
    audit_attempts: u32,
}

impl<A, E> CompensateOperation<A, E>
where
    A: AuditRecorder,
    E: EventPublisher,
{
    pub fn new(audit: A, events: E, coordinator: CompensationCoordinator) -> Self {
        Self {
            audit,
            events,
            coordinator,
            audit_attempts: RecoverySettings::default().audit_attempts(),
        }
    }

    #[must_use]
    pub fn with_audit_attempts(mut self, attempts: u32) -> Self {
        self.audit_attempts = attempts.max(1);
        self
    }

    /// Undo every action in the request's ledger, newest first, then record
    /// and announce the outcome.
    ///
    /// A partial compensation is a successful call; the response says which
    /// actions could not be reversed.
    ///
    /// # Errors
    ///
    /// Returns an error if the compensation walk was interrupted by the
    /// runtime or the outcome cannot be encoded.
    pub async fn execute(&self, request: CompensateRequest) -> Result<CompensateResponse> {
        run_compensation(
            &self.coordinator,
            &self.audit,
            &self.events,
            self.audit_attempts,
            request,
        )
        .await
    }
}

pub(crate) async fn run_compensation<A, E>(
    coordinator: &CompensationCoordinator,
    audit: &A,
    events: &E,
    audit_attempts: u32,
    request: CompensateRequest,
) -> Result<CompensateResponse>
where
    A: AuditRecorder + ?Sized,
    E: EventPublisher + ?Sized,
{
    let CompensateRequest {
        instance_id,
        compensation_type,
        reason,
        ledger,
    } = request;

    info!(
        %instance_id,
        %compensation_type,
        %reason,
        records = ledger.len(),
        "compensation requested"
    );
    let outcome = coordinator.compensate_detached(ledger).await?;
    if !outcome.compensation_complete() {
        warn!(%instance_id, summary = %outcome.summary(), "compensation incomplete");
    }

    let mut response = CompensateResponse {
        run_id: Uuid::new_v4().to_string(),
        instance_id,
        compensation_type,
        reason,
        outcome,
        compensated_at: Utc::now(),
        collaborators: CollaboratorStatus::new(),
    };
    let mut status = CollaboratorStatus::new();

    let record = to_json("compensation run", &response)?;
    persist_with_retries(
        audit,
        COMPENSATION_RUNS,
        &response.run_id,
        &record,
        audit_attempts,
        &mut status,
    )
    .await;

    let event = json!({
        "instanceId": response.instance_id,
        "compensationType": response.compensation_type,
        "reason": response.reason,
        "compensatedActions": response.outcome.compensated_actions(),
        "compensationComplete": response.outcome.compensation_complete(),
        "timestamp": response.compensated_at,
    });
    publish_recorded(
        events,
        COMPENSATION_EXECUTED,
        &response.instance_id,
        &event,
        &mut status,
    )
    .await;

    response.collaborators = status;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use casework_core::{ActionMetadata, ActionType};
    use casework_saga::{ActionLedger, HandlerRegistry};

    use super::*;
    use crate::mocks::{InMemoryAuditRecorder, RecordingEventPublisher};
    use crate::providers::standard_registry;
    use crate::types::Collaborator;

    fn request(ledger: LedgerSnapshot) -> CompensateRequest {
        CompensateRequest {
            instance_id: "INST-1".to_string(),
            compensation_type: "AUTORIZACAO".to_string(),
            reason: "payment step failed".to_string(),
            ledger,
        }
    }

    fn authorization_then_payment() -> LedgerSnapshot {
        let mut ledger = ActionLedger::new();
        ledger.append(
            ActionType::AutorizacaoCriada,
            [("numeroAutorizacao".to_string(), "AUT-1".to_string())]
                .into_iter()
                .collect(),
        );
        ledger.append(
            ActionType::PagamentoReservado,
            [("pagamentoId".to_string(), "PAG-1".to_string())]
                .into_iter()
                .collect(),
        );
        ledger.snapshot()
    }

    #[tokio::test]
    async fn persists_and_announces_outcome() -> anyhow::Result<()> {
        let audit = Arc::new(InMemoryAuditRecorder::new());
        let events = Arc::new(RecordingEventPublisher::new());
        let registry = standard_registry(events.clone())?;
        let operation = CompensateOperation::new(
            audit.clone(),
            events.clone(),
            CompensationCoordinator::new(Arc::new(registry)),
        );

        let response = operation.execute(request(authorization_then_payment())).await?;

        assert!(response.compensation_complete());
        assert_eq!(
            response.compensated_actions(),
            ["PAGAMENTO_LIBERADO", "AUTORIZACAO_CANCELADA"]
        );
        assert!(response.collaborators.is_clean());

        let stored = audit
            .get(COMPENSATION_RUNS, &response.run_id)
            .expect("run should be persisted");
        assert_eq!(stored["instanceId"], "INST-1");
        assert_eq!(stored["compensationComplete"], true);

        let announced = events.events_on(COMPENSATION_EXECUTED);
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0].key, "INST-1");
        assert_eq!(announced[0].payload["reason"], "payment step failed");
        assert_eq!(
            announced[0].payload["compensatedActions"],
            json!(["PAGAMENTO_LIBERADO", "AUTORIZACAO_CANCELADA"])
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_ledger_is_complete() -> anyhow::Result<()> {
        let operation = CompensateOperation::new(
            InMemoryAuditRecorder::new(),
            RecordingEventPublisher::new(),
            CompensationCoordinator::new(Arc::new(HandlerRegistry::new())),
        );

        let response = operation.execute(request(LedgerSnapshot::empty())).await?;

        assert!(response.compensation_complete());
        assert!(response.compensated_actions().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_action_is_reported_not_raised() -> anyhow::Result<()> {
        let mut ledger = ActionLedger::new();
        ledger.append(ActionType::from("X_UNKNOWN"), ActionMetadata::new());
        let operation = CompensateOperation::new(
            InMemoryAuditRecorder::new(),
            RecordingEventPublisher::new(),
            CompensationCoordinator::new(Arc::new(HandlerRegistry::new())),
        );

        let response = operation.execute(request(ledger.snapshot())).await?;

        assert!(!response.compensation_complete());
        assert_eq!(response.compensated_actions(), ["NAO_COMPENSADO_X_UNKNOWN"]);
        Ok(())
    }

    #[tokio::test]
    async fn collaborator_failures_do_not_fail_the_run() -> anyhow::Result<()> {
        let operation = CompensateOperation::new(
            InMemoryAuditRecorder::new().failing_collection(COMPENSATION_RUNS),
            RecordingEventPublisher::failing("broker down"),
            CompensationCoordinator::new(Arc::new(HandlerRegistry::new())),
        )
        .with_audit_attempts(2);

        let response = operation.execute(request(LedgerSnapshot::empty())).await?;

        assert!(response.compensation_complete());
        assert!(response.collaborators.failed(Collaborator::AuditRecorder));
        assert!(response.collaborators.failed(Collaborator::EventPublisher));
        Ok(())
    }

    #[tokio::test]
    async fn response_serializes_outcome_fields_inline() -> anyhow::Result<()> {
        let operation = CompensateOperation::new(
            InMemoryAuditRecorder::new(),
            RecordingEventPublisher::new(),
            CompensationCoordinator::new(Arc::new(HandlerRegistry::new())),
        );

        let response = operation.execute(request(LedgerSnapshot::empty())).await?;
        let value = serde_json::to_value(&response)?;

        assert_eq!(value["compensationComplete"], true);
        assert!(value["compensatedAt"].is_string());
        assert!(value["compensatedActions"].is_array());
        Ok(())
    }
}
