use std::fmt;

use serde::Serialize;

use crate::error::CollaboratorError;

/// Step taken while handling a failure, in the order it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryAction {
    AgendadoRetry,
    ExecutadoCompensacao,
    AcionadaRotaAlternativa,
    EscaladoSuporte,
    NotificadoCliente,
    RegistradoRca,
}

impl RecoveryAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AgendadoRetry => "AGENDADO_RETRY",
            Self::ExecutadoCompensacao => "EXECUTADO_COMPENSACAO",
            Self::AcionadaRotaAlternativa => "ACIONADA_ROTA_ALTERNATIVA",
            Self::EscaladoSuporte => "ESCALADO_SUPORTE",
            Self::NotificadoCliente => "NOTIFICADO_CLIENTE",
            Self::RegistradoRca => "REGISTRADO_RCA",
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the customer is told about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerNotice {
    TemporaryIssue,
    ManualRequired,
}

impl CustomerNotice {
    #[must_use]
    pub fn for_recoverable(recoverable: bool) -> Self {
        if recoverable {
            Self::TemporaryIssue
        } else {
            Self::ManualRequired
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Collaborator {
    AuditRecorder,
    EventPublisher,
    EscalationGateway,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AuditRecorder => "audit recorder",
            Self::EventPublisher => "event publisher",
            Self::EscalationGateway => "escalation gateway",
        })
    }
}

/// A collaborator call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorFailure {
    pub collaborator: Collaborator,
    /// Collection, topic or case the call was about.
    pub target: String,
    pub error: String,
}

/// Outcome of the collaborator calls made by one operation.
///
/// Collaborator failures never change the core decision; they are reported
/// here and the caller decides whether to retry, alert or propagate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorStatus {
    failures: Vec<CollaboratorFailure>,
}

impl CollaboratorStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        collaborator: Collaborator,
        target: impl Into<String>,
        error: &CollaboratorError,
    ) {
        self.failures.push(CollaboratorFailure {
            collaborator,
            target: target.into(),
            error: error_chain(error),
        });
    }

    pub fn merge(&mut self, other: CollaboratorStatus) {
        self.failures.extend(other.failures);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[CollaboratorFailure] {
        &self.failures
    }

    #[must_use]
    pub fn failed(&self, collaborator: Collaborator) -> bool {
        self.failures.iter().any(|f| f.collaborator == collaborator)
    }
}

fn error_chain(error: &CollaboratorError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
