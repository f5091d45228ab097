use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CollaboratorError, OperationError};
use crate::traits::{AuditRecorder, EventPublisher};
use crate::types::{Collaborator, CollaboratorStatus};
use crate::Result;

pub(crate) fn to_json<T: Serialize>(what: &'static str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| OperationError::Serialize { what, source })
}

/// Persist `record`, retrying up to `attempts` times. Returns whether the
/// record was stored; the last failure is recorded in `status`.
pub(crate) async fn persist_with_retries<A: AuditRecorder + ?Sized>(
    audit: &A,
    collection: &str,
    key: &str,
    record: &Value,
    attempts: u32,
    status: &mut CollaboratorStatus,
) -> bool {
    let mut last_error: Option<CollaboratorError> = None;
    for attempt in 1..=attempts.max(1) {
        match audit.persist(collection, key, record).await {
            Ok(()) => {
                debug!(collection, key, attempt, "audit record stored");
                return true;
            }
            Err(err) => {
                warn!(collection, key, attempt, error = %err, "audit persistence attempt failed");
                last_error = Some(err);
            }
        }
    }
    if let Some(err) = last_error {
        status.record(Collaborator::AuditRecorder, collection, &err);
    }
    false
}

pub(crate) async fn publish_recorded<E: EventPublisher + ?Sized>(
    events: &E,
    topic: &str,
    key: &str,
    payload: &Value,
    status: &mut CollaboratorStatus,
) -> bool {
    match events.publish(topic, key, payload).await {
        Ok(()) => true,
        Err(err) => {
            warn!(topic, key, error = %err, "event publication failed");
            status.record(Collaborator::EventPublisher, topic, &err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mocks::{InMemoryAuditRecorder, RecordingEventPublisher};

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let audit = InMemoryAuditRecorder::new().with_transient_failures(2);
        let mut status = CollaboratorStatus::new();

        let stored =
            persist_with_retries(&audit, "rca_records", "r-1", &json!({}), 3, &mut status).await;

        assert!(stored);
        assert!(status.is_clean());
        assert_eq!(audit.attempts(), 3);
        assert!(audit.get("rca_records", "r-1").is_some());
    }

    #[tokio::test]
    async fn exhausted_attempts_are_reported() {
        let audit = InMemoryAuditRecorder::new().failing_collection("rca_records");
        let mut status = CollaboratorStatus::new();

        let stored =
            persist_with_retries(&audit, "rca_records", "r-1", &json!({}), 3, &mut status).await;

        assert!(!stored);
        assert_eq!(audit.attempts(), 3);
        assert!(status.failed(Collaborator::AuditRecorder));
        assert_eq!(status.failures().len(), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let audit = InMemoryAuditRecorder::new();
        let mut status = CollaboratorStatus::new();

        assert!(persist_with_retries(&audit, "c", "k", &json!({}), 0, &mut status).await);
        assert_eq!(audit.attempts(), 1);
    }

    #[tokio::test]
    async fn publish_failure_is_recorded() {
        let events = RecordingEventPublisher::failing("broker down");
        let mut status = CollaboratorStatus::new();

        let published =
            publish_recorded(&events, "failure-handled", "C-1", &json!({}), &mut status).await;

        assert!(!published);
        assert_eq!(status.failures()[0].target, "failure-handled");
        assert_eq!(status.failures()[0].error, "broker down");
    }
}
