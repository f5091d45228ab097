use std::sync::Arc;
use std::time::Duration;

use casework_core::ActionRecord;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::audit::CompensationAuditLog;
use crate::error::SagaError;
use crate::handler::{CompensationHandler, HandlerError};
use crate::ledger::LedgerSnapshot;
use crate::outcome::RecoveryOutcome;
use crate::registry::HandlerRegistry;

/// Walks a ledger snapshot from the newest record to the oldest, invoking the
/// registered handler for each action.
///
/// Every handler call runs in its own task bounded by the handler timeout. A
/// failure, panic or timeout is recorded against that record and the walk
/// moves on, so one failed undo never prevents undoing earlier actions.
#[derive(Debug, Clone)]
pub struct CompensationCoordinator {
    registry: Arc<HandlerRegistry>,
    handler_timeout: Duration,
}

impl CompensationCoordinator {
    pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            handler_timeout: Self::DEFAULT_HANDLER_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_handler_timeout(mut self, handler_timeout: Duration) -> Self {
        self.handler_timeout = handler_timeout;
        self
    }

    #[must_use]
    pub fn handler_timeout(&self) -> Duration {
        self.handler_timeout
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Compensate every record of `snapshot` in reverse append order.
    pub async fn compensate(&self, snapshot: &LedgerSnapshot) -> RecoveryOutcome {
        info!(records = snapshot.len(), "starting compensation walk");
        let mut audit_log = CompensationAuditLog::new();

        for record in snapshot.iter().rev() {
            let started_at = Utc::now();
            let Some(handler) = self.registry.get(&record.action_type) else {
                warn!(
                    action_type = %record.action_type,
                    sequence_index = record.sequence_index,
                    "no compensation handler registered"
                );
                audit_log.record_unhandled(record, started_at);
                continue;
            };

            debug!(
                action_type = %record.action_type,
                sequence_index = record.sequence_index,
                description = %handler.compensation_description(),
                "compensating action"
            );

            let tag = handler.reversed_tag().to_string();
            match self.invoke(handler, record.clone()).await {
                Ok(()) => {
                    debug!(sequence_index = record.sequence_index, %tag, "action compensated");
                    audit_log.record_compensated(record, &tag, started_at);
                }
                Err(err) => {
                    error!(
                        action_type = %record.action_type,
                        sequence_index = record.sequence_index,
                        error = %err,
                        "compensation failed (continuing with remaining records)"
                    );
                    audit_log.record_failed(record, &err, started_at);
                }
            }
        }

        let outcome = RecoveryOutcome::from_steps(audit_log.into_steps());
        info!(
            compensated = outcome.compensated_actions().len(),
            complete = outcome.compensation_complete(),
            "compensation walk finished"
        );
        outcome
    }

    /// Run the walk on its own task so that dropping the returned future does
    /// not stop it. Compensation rolls back effects that were already applied
    /// and must reach the first record even if the surrounding instance is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns `SagaError::WalkInterrupted` if the runtime shut down before
    /// the walk finished.
    pub async fn compensate_detached(
        &self,
        snapshot: LedgerSnapshot,
    ) -> Result<RecoveryOutcome, SagaError> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.compensate(&snapshot).await })
            .await
            .map_err(SagaError::WalkInterrupted)
    }

    async fn invoke(
        &self,
        handler: Arc<dyn CompensationHandler>,
        record: ActionRecord,
    ) -> Result<(), HandlerError> {
        let mut task = tokio::spawn(async move { handler.compensate(&record).await });

        match tokio::time::timeout(self.handler_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) if join_error.is_panic() => Err(HandlerError::Panicked),
            Ok(Err(_)) => Err(HandlerError::Interrupted),
            Err(_) => {
                task.abort();
                Err(HandlerError::TimedOut(self.handler_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use casework_core::{ActionMetadata, ActionType};

    use super::*;
    use crate::ledger::ActionLedger;

    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<String>>>);

    impl CallLog {
        fn push(&self, entry: String) {
            self.0.lock().expect("call log lock").push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().expect("call log lock").clone()
        }
    }

    struct Recording {
        tag: &'static str,
        log: CallLog,
    }

    #[async_trait]
    impl CompensationHandler for Recording {
        fn reversed_tag(&self) -> &str {
            self.tag
        }

        async fn compensate(&self, record: &ActionRecord) -> Result<(), HandlerError> {
            self.log.push(record.action_type.to_string());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl CompensationHandler for Failing {
        fn reversed_tag(&self) -> &str {
            "NEVER"
        }

        async fn compensate(&self, _record: &ActionRecord) -> Result<(), HandlerError> {
            Err(HandlerError::failed("downstream rejected"))
        }
    }

    fn ledger(actions: &[ActionType]) -> LedgerSnapshot {
        let mut ledger = ActionLedger::new();
        for action in actions {
            ledger.append(action.clone(), ActionMetadata::new());
        }
        ledger.snapshot()
    }

    #[tokio::test]
    async fn empty_ledger_is_complete() {
        let coordinator = CompensationCoordinator::new(Arc::new(HandlerRegistry::new()));

        let outcome = coordinator.compensate(&LedgerSnapshot::empty()).await;

        assert!(outcome.compensation_complete());
        assert!(outcome.compensated_actions().is_empty());
    }

    #[tokio::test]
    async fn handlers_run_newest_first() -> anyhow::Result<()> {
        let log = CallLog::default();
        let registry = HandlerRegistry::new()
            .with_handler(
                ActionType::AutorizacaoCriada,
                Recording {
                    tag: "AUTORIZACAO_CANCELADA",
                    log: log.clone(),
                },
            )?
            .with_handler(
                ActionType::PagamentoReservado,
                Recording {
                    tag: "PAGAMENTO_LIBERADO",
                    log: log.clone(),
                },
            )?;
        let coordinator = CompensationCoordinator::new(Arc::new(registry));

        let outcome = coordinator
            .compensate(&ledger(&[
                ActionType::AutorizacaoCriada,
                ActionType::PagamentoReservado,
            ]))
            .await;

        assert_eq!(log.entries(), ["PAGAMENTO_RESERVADO", "AUTORIZACAO_CRIADA"]);
        assert_eq!(
            outcome.compensated_actions(),
            ["PAGAMENTO_LIBERADO", "AUTORIZACAO_CANCELADA"]
        );
        assert!(outcome.compensation_complete());
        Ok(())
    }

    #[tokio::test]
    async fn failed_handler_does_not_stop_walk() -> anyhow::Result<()> {
        let log = CallLog::default();
        let registry = HandlerRegistry::new()
            .with_handler(
                ActionType::AutorizacaoCriada,
                Recording {
                    tag: "AUTORIZACAO_CANCELADA",
                    log: log.clone(),
                },
            )?
            .with_handler(ActionType::PagamentoReservado, Failing)?;
        let coordinator = CompensationCoordinator::new(Arc::new(registry));

        let outcome = coordinator
            .compensate(&ledger(&[
                ActionType::AutorizacaoCriada,
                ActionType::PagamentoReservado,
            ]))
            .await;

        assert_eq!(
            outcome.compensated_actions(),
            ["FALHA_COMPENSACAO_PAGAMENTO_RESERVADO", "AUTORIZACAO_CANCELADA"]
        );
        assert_eq!(log.entries(), ["AUTORIZACAO_CRIADA"]);
        assert!(!outcome.compensation_complete());
        Ok(())
    }

    #[tokio::test]
    async fn unregistered_action_is_marked_not_compensated() {
        let coordinator = CompensationCoordinator::new(Arc::new(HandlerRegistry::new()));

        let outcome = coordinator
            .compensate(&ledger(&[ActionType::from("X_UNKNOWN")]))
            .await;

        assert_eq!(outcome.compensated_actions(), ["NAO_COMPENSADO_X_UNKNOWN"]);
        assert!(!outcome.compensation_complete());
    }

    #[test]
    fn default_timeout_applies_until_overridden() {
        let coordinator = CompensationCoordinator::new(Arc::new(HandlerRegistry::new()));
        assert_eq!(
            coordinator.handler_timeout(),
            CompensationCoordinator::DEFAULT_HANDLER_TIMEOUT
        );

        let coordinator = coordinator.with_handler_timeout(Duration::from_millis(10));
        assert_eq!(coordinator.handler_timeout(), Duration::from_millis(10));
    }
}
