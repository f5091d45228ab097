use casework_core::{
    Classification, FailureRecord, Impact, RecoveryState, StateTrail, Strategy,
};
use casework_saga::{CompensationCoordinator, LedgerSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use super::compensate::{CompensateRequest, CompensateResponse, run_compensation};
use super::persistence::{persist_with_retries, publish_recorded, to_json};
use super::register_rca::{RegisterRcaRequest, register};
use crate::Result;
use crate::collections::FAILURE_RECORDS;
use crate::config::RecoverySettings;
use crate::topics::FAILURE_HANDLED;
use crate::traits::{AuditRecorder, EscalationGateway, EventPublisher};
use crate::types::{Collaborator, CollaboratorStatus, CustomerNotice, RecoveryAction};

/// Route taken when a document cannot be validated automatically.
pub const ALTERNATE_ROUTE: &str = "VERIFICACAO_MANUAL";

#[derive(Debug, Clone, Default)]
pub struct HandleFailureRequest {
    pub case_id: String,
    pub failure_type: String,
    pub error_message: String,
    pub stage: String,
    /// Actions applied by the failed instance, compensated when the selected
    /// strategy calls for it.
    pub ledger: Option<LedgerSnapshot>,
    pub impact: Option<Impact>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub failure_id: String,
    pub case_id: String,
    pub failure_type: String,
    pub stage: String,
    #[serde(flatten)]
    pub classification: Classification,
    pub recovery_actions: Vec<RecoveryAction>,
    pub requires_escalation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_ticket: Option<String>,
    pub customer_notice: CustomerNotice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensation: Option<CompensateResponse>,
    pub rca_id: String,
    pub rca_recorded: bool,
    pub state: RecoveryState,
    pub state_history: Vec<RecoveryState>,
    pub collaborators: CollaboratorStatus,
    pub handled_at: DateTime<Utc>,
}

pub struct HandleFailureOperation<A, E, G> {
    audit: A,
    events: E,
    escalation: G,
    coordinator: CompensationCoordinator,
    settings: RecoverySettings,
}

impl<A, E, G> HandleFailureOperation<A, E, G>
where
    A: AuditRecorder,
    E: EventPublisher,
    G: EscalationGateway,
{
    pub fn new(audit: A, events: E, escalation: G, coordinator: CompensationCoordinator) -> Self {
        Self {
            audit,
            events,
            escalation,
            coordinator,
            settings: RecoverySettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RecoverySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Classify a failure, run the recovery its strategy calls for, escalate
    /// when needed and leave an RCA trail.
    ///
    /// The report reaches `CLOSED` only when the RCA record was stored.
    ///
    /// # Errors
    ///
    /// Returns an error on an illegal state transition, an interrupted
    /// compensation walk or a record that cannot be encoded. Collaborator
    /// failures are reported in the returned report instead.
    pub async fn execute(&self, request: HandleFailureRequest) -> Result<FailureReport> {
        let HandleFailureRequest {
            case_id,
            failure_type,
            error_message,
            stage,
            ledger,
            impact,
        } = request;
        let now = Utc::now();
        let attempts = self.settings.audit_attempts();
        let mut trail = StateTrail::new();
        let mut status = CollaboratorStatus::new();
        let mut actions = Vec::new();

        let classification = casework_triage::classify(&failure_type, &stage);
        trail.advance(RecoveryState::Classified)?;
        let strategy = classification.strategy;
        trail.advance(RecoveryState::StrategySelected)?;
        info!(
            %case_id,
            %failure_type,
            %stage,
            severity = %classification.severity,
            category = %classification.category,
            recoverable = classification.recoverable,
            %strategy,
            "failure classified"
        );
        trail.advance(RecoveryState::entered_by(strategy))?;

        let mut retry_at = None;
        let mut alternate_route = None;
        let mut compensation = None;
        if classification.recoverable {
            match strategy {
                Strategy::Retry => {
                    let at = now
                        .checked_add_signed(self.settings.retry_delay())
                        .unwrap_or(DateTime::<Utc>::MAX_UTC);
                    info!(%case_id, retry_at = %at, "retry scheduled");
                    retry_at = Some(at);
                    actions.push(RecoveryAction::AgendadoRetry);
                }
                Strategy::Compensacao => {
                    let request = CompensateRequest {
                        instance_id: case_id.clone(),
                        compensation_type: casework_triage::normalize_failure_type(&failure_type),
                        reason: if error_message.trim().is_empty() {
                            failure_type.clone()
                        } else {
                            error_message.clone()
                        },
                        ledger: ledger.unwrap_or_default(),
                    };
                    let response = run_compensation(
                        &self.coordinator,
                        &self.audit,
                        &self.events,
                        attempts,
                        request,
                    )
                    .await?;
                    trail.advance(if response.compensation_complete() {
                        RecoveryState::Compensated
                    } else {
                        RecoveryState::PartiallyCompensated
                    })?;
                    status.merge(response.collaborators.clone());
                    actions.push(RecoveryAction::ExecutadoCompensacao);
                    compensation = Some(response);
                }
                Strategy::RotaAlternativa => {
                    info!(%case_id, route = ALTERNATE_ROUTE, "alternate route engaged");
                    alternate_route = Some(ALTERNATE_ROUTE.to_string());
                    actions.push(RecoveryAction::AcionadaRotaAlternativa);
                }
                Strategy::EscalacaoSuporte | Strategy::ManualIntervention => {}
            }
        }

        let requires_escalation = classification.requires_escalation();
        let mut escalation_ticket = None;
        if requires_escalation {
            match self
                .escalation
                .escalate(&case_id, classification.severity)
                .await
            {
                Ok(ticket) => {
                    escalation_ticket = Some(ticket);
                    actions.push(RecoveryAction::EscaladoSuporte);
                }
                Err(err) => {
                    error!(
                        %case_id,
                        severity = %classification.severity,
                        error = %err,
                        "escalation could not be delivered"
                    );
                    status.record(Collaborator::EscalationGateway, case_id.as_str(), &err);
                }
            }
        }

        let customer_notice = CustomerNotice::for_recoverable(classification.recoverable);
        actions.push(RecoveryAction::NotificadoCliente);

        let failure_record = FailureRecord {
            failure_id: Uuid::new_v4().to_string(),
            case_id,
            failure_type,
            stage,
            error_message,
            occurred_at: now,
            classification,
        };
        let record = to_json("failure record", &failure_record)?;
        persist_with_retries(
            &self.audit,
            FAILURE_RECORDS,
            &failure_record.failure_id,
            &record,
            attempts,
            &mut status,
        )
        .await;

        let mut rca_request = RegisterRcaRequest::for_failure(failure_record.clone());
        rca_request.impact = impact;
        let rca = register(&self.audit, &self.events, attempts, rca_request).await?;
        status.merge(rca.collaborators);
        if rca.recorded {
            actions.push(RecoveryAction::RegistradoRca);
            trail.advance(RecoveryState::Closed)?;
        }

        let FailureRecord {
            failure_id,
            case_id,
            failure_type,
            stage,
            ..
        } = failure_record;
        let mut report = FailureReport {
            failure_id,
            case_id,
            failure_type,
            stage,
            classification,
            recovery_actions: actions,
            requires_escalation,
            escalation_ticket,
            customer_notice,
            retry_at,
            alternate_route,
            compensation,
            rca_id: rca.rca.rca_id,
            rca_recorded: rca.recorded,
            state: trail.current(),
            state_history: trail.states().to_vec(),
            collaborators: CollaboratorStatus::new(),
            handled_at: Utc::now(),
        };

        let event = json!({
            "caseId": report.case_id,
            "failureId": report.failure_id,
            "failureType": report.failure_type,
            "stage": report.stage,
            "severity": report.classification.severity,
            "category": report.classification.category,
            "recoverable": report.classification.recoverable,
            "strategy": report.classification.strategy,
            "recoveryActions": report.recovery_actions,
            "requiresEscalation": report.requires_escalation,
            "escalationTicket": report.escalation_ticket,
            "customerNotice": report.customer_notice,
            "state": report.state,
            "timestamp": report.handled_at,
        });
        publish_recorded(
            &self.events,
            FAILURE_HANDLED,
            &report.case_id,
            &event,
            &mut status,
        )
        .await;

        report.collaborators = status;
        info!(
            case_id = %report.case_id,
            state = %report.state,
            actions = report.recovery_actions.len(),
            requires_escalation = report.requires_escalation,
            "failure handled"
        );
        Ok(report)
    }
}
