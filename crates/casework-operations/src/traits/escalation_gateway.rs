use std::sync::Arc;

use async_trait::async_trait;
use casework_core::Severity;

use crate::error::CollaboratorError;

/// Opens support tickets for failures that need a human.
#[async_trait]
pub trait EscalationGateway: Send + Sync {
    /// Returns the id of the opened ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket could not be opened.
    async fn escalate(&self, case_id: &str, severity: Severity)
    -> Result<String, CollaboratorError>;
}

#[async_trait]
impl<T: EscalationGateway + ?Sized> EscalationGateway for Arc<T> {
    async fn escalate(
        &self,
        case_id: &str,
        severity: Severity,
    ) -> Result<String, CollaboratorError> {
        (**self).escalate(case_id, severity).await
    }
}
