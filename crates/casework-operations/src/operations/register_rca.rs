use casework_core::{FailureRecord, Impact, RcaRecord};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::persistence::{persist_with_retries, publish_recorded, to_json};
use crate::Result;
use crate::collections::RCA_RECORDS;
use crate::config::RecoverySettings;
use crate::topics::RCA_REGISTERED;
use crate::traits::{AuditRecorder, EventPublisher};
use crate::types::CollaboratorStatus;

#[derive(Debug, Clone)]
pub struct RegisterRcaRequest {
    pub failure_record: FailureRecord,
    pub impact: Option<Impact>,
    /// Causes identified by an analyst; derived from the failure type when
    /// empty.
    pub root_causes: Vec<String>,
    pub five_whys: Vec<String>,
}

impl RegisterRcaRequest {
    #[must_use]
    pub fn for_failure(failure_record: FailureRecord) -> Self {
        Self {
            failure_record,
            impact: None,
            root_causes: Vec::new(),
            five_whys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRcaResponse {
    pub rca: RcaRecord,
    /// True once the record is durably stored.
    pub recorded: bool,
    pub collaborators: CollaboratorStatus,
}

pub struct RegisterRcaOperation<A, E> {
    audit: A,
    events: E,
    audit_attempts: u32,
}

impl<A, E> RegisterRcaOperation<A, E>
where
    A: AuditRecorder,
    E: EventPublisher,
{
    pub fn new(audit: A, events: E) -> Self {
        Self {
            audit,
            events,
            audit_attempts: RecoverySettings::default().audit_attempts(),
        }
    }

    #[must_use]
    pub fn with_audit_attempts(mut self, attempts: u32) -> Self {
        self.audit_attempts = attempts.max(1);
        self
    }

    /// Build the RCA record for a failure, store it and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded. Storage and
    /// publication failures are reported through `recorded` and
    /// `collaborators`.
    pub async fn execute(&self, request: RegisterRcaRequest) -> Result<RegisterRcaResponse> {
        register(&self.audit, &self.events, self.audit_attempts, request).await
    }
}

pub(crate) async fn register<A, E>(
    audit: &A,
    events: &E,
    audit_attempts: u32,
    request: RegisterRcaRequest,
) -> Result<RegisterRcaResponse>
where
    A: AuditRecorder + ?Sized,
    E: EventPublisher + ?Sized,
{
    let mut rca = casework_triage::build_rca(
        Uuid::new_v4().to_string(),
        request.failure_record,
        request.impact,
        request.root_causes,
        Utc::now(),
    );
    rca.five_whys = request.five_whys;
    let mut collaborators = CollaboratorStatus::new();

    let record = to_json("RCA record", &rca)?;
    let recorded = persist_with_retries(
        audit,
        RCA_RECORDS,
        &rca.rca_id,
        &record,
        audit_attempts,
        &mut collaborators,
    )
    .await;

    if !recorded {
        warn!(
            rca_id = %rca.rca_id,
            case_id = %rca.failure_record.case_id,
            "RCA could not be stored"
        );
        return Ok(RegisterRcaResponse {
            rca,
            recorded,
            collaborators,
        });
    }

    info!(
        rca_id = %rca.rca_id,
        case_id = %rca.failure_record.case_id,
        category = %rca.category,
        causes = rca.root_causes.len(),
        actions = rca.actions_total,
        deadline = %rca.implementation_deadline,
        "RCA registered"
    );
    let event = json!({
        "rcaId": rca.rca_id,
        "caseId": rca.failure_record.case_id,
        "failureType": rca.failure_record.failure_type,
        "severity": rca.failure_record.classification.severity,
        "category": rca.category,
        "rootCauseCount": rca.root_causes.len(),
        "correctiveActionCount": rca.corrective_actions.len(),
    });
    publish_recorded(
        events,
        RCA_REGISTERED,
        &rca.rca_id,
        &event,
        &mut collaborators,
    )
    .await;

    Ok(RegisterRcaResponse {
        rca,
        recorded,
        collaborators,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use casework_core::{Category, Classification, RcaCategory, RcaStatus, Severity, Strategy};
    use chrono::TimeDelta;

    use super::*;
    use crate::mocks::{InMemoryAuditRecorder, RecordingEventPublisher};
    use crate::types::Collaborator;

    fn failure_record() -> FailureRecord {
        FailureRecord {
            failure_id: "F-1".to_string(),
            case_id: "C-1".to_string(),
            failure_type: "INTEGRACAO_FALHOU".to_string(),
            stage: "ATIVACAO".to_string(),
            error_message: "claims API returned 503".to_string(),
            occurred_at: Utc::now(),
            classification: Classification {
                severity: Severity::Critica,
                category: Category::Integracao,
                recoverable: false,
                strategy: Strategy::ManualIntervention,
            },
        }
    }

    #[tokio::test]
    async fn stores_rca_with_derived_causes() -> anyhow::Result<()> {
        let audit = Arc::new(InMemoryAuditRecorder::new());
        let operation = RegisterRcaOperation::new(audit.clone(), RecordingEventPublisher::new());

        let response = operation
            .execute(RegisterRcaRequest::for_failure(failure_record()))
            .await?;

        assert!(response.recorded);
        assert_eq!(
            response.rca.root_causes,
            ["Timeout em API externa", "Falta de mecanismo de retry"]
        );
        assert_eq!(
            response.rca.implementation_deadline - response.rca.registered_at,
            TimeDelta::days(7)
        );
        assert_eq!(
            response.rca.review_date - response.rca.registered_at,
            TimeDelta::days(30)
        );
        assert_eq!(response.rca.category, RcaCategory::Integracao);
        assert_eq!(response.rca.status, RcaStatus::Aberta);
        assert_eq!(response.rca.actions_total, 2);
        let stored = audit
            .get(RCA_RECORDS, &response.rca.rca_id)
            .expect("rca should be stored");
        assert_eq!(stored["failureRecord"]["caseId"], "C-1");
        assert_eq!(stored["correctiveActions"][0]["status"], "PENDENTE");
        assert_eq!(stored["correctiveActions"][0]["type"], "CORRETIVA");
        assert_eq!(stored["correctiveActions"][0]["priority"], "CRITICA");
        assert_eq!(stored["status"], "ABERTA");
        assert_eq!(stored["actionsImplemented"], 0);
        assert!(stored.get("fiveWhys").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn announces_registered_rca() -> anyhow::Result<()> {
        let events = Arc::new(RecordingEventPublisher::new());
        let operation = RegisterRcaOperation::new(InMemoryAuditRecorder::new(), events.clone());
        let mut request = RegisterRcaRequest::for_failure(failure_record());
        request.five_whys = vec![
            "A API do parceiro não respondeu".to_string(),
            "Não há retry configurado".to_string(),
        ];

        let response = operation.execute(request).await?;

        assert_eq!(response.rca.five_whys.len(), 2);
        assert!(response.collaborators.is_clean());
        let announced = events.events_on(RCA_REGISTERED);
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0].key, response.rca.rca_id);
        assert_eq!(announced[0].payload["severity"], "CRITICA");
        assert_eq!(announced[0].payload["category"], "INTEGRACAO");
        assert_eq!(announced[0].payload["rootCauseCount"], 2);
        assert_eq!(announced[0].payload["correctiveActionCount"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_is_reported_and_not_announced() -> anyhow::Result<()> {
        let audit = Arc::new(InMemoryAuditRecorder::new().failing_collection(RCA_RECORDS));
        let events = Arc::new(RecordingEventPublisher::new());
        let operation =
            RegisterRcaOperation::new(audit.clone(), events.clone()).with_audit_attempts(4);
        let mut request = RegisterRcaRequest::for_failure(failure_record());
        request.root_causes = vec!["Certificado expirado".to_string()];

        let response = operation.execute(request).await?;

        assert!(!response.recorded);
        assert_eq!(audit.attempts(), 4);
        assert!(response.collaborators.failed(Collaborator::AuditRecorder));
        assert_eq!(response.rca.root_causes, ["Certificado expirado"]);
        assert!(events.events_on(RCA_REGISTERED).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn publish_failure_keeps_rca_recorded() -> anyhow::Result<()> {
        let operation = RegisterRcaOperation::new(
            InMemoryAuditRecorder::new(),
            RecordingEventPublisher::failing("broker down"),
        );

        let response = operation
            .execute(RegisterRcaRequest::for_failure(failure_record()))
            .await?;

        assert!(response.recorded);
        assert!(response.collaborators.failed(Collaborator::EventPublisher));
        Ok(())
    }
}
