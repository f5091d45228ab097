use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use casework_core::Severity;
use serde_json::Value;

use crate::error::CollaboratorError;
use crate::traits::{AuditRecorder, EscalationGateway, EventPublisher};

#[derive(Default)]
pub struct InMemoryAuditRecorder {
    records: Mutex<HashMap<(String, String), Value>>,
    failing_collections: HashSet<String>,
    transient_failures: AtomicU32,
    attempts: AtomicU32,
}

impl InMemoryAuditRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write to `collection` fails.
    #[must_use]
    pub fn failing_collection(mut self, collection: &str) -> Self {
        self.failing_collections.insert(collection.to_string());
        self
    }

    /// The next `count` writes fail, whatever their collection.
    #[must_use]
    pub fn with_transient_failures(self, count: u32) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn get(&self, collection: &str, key: &str) -> Option<Value> {
        self.records
            .lock()
            .expect("lock poisoned")
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.records
            .lock()
            .expect("lock poisoned")
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditRecorder for InMemoryAuditRecorder {
    async fn persist(
        &self,
        collection: &str,
        key: &str,
        record: &Value,
    ) -> Result<(), CollaboratorError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing_collections.contains(collection) {
            return Err(CollaboratorError::Unavailable(format!(
                "collection '{collection}' is read-only"
            )));
        }
        let transient = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if transient.is_ok() {
            return Err(CollaboratorError::Unavailable(
                "audit store timed out".to_string(),
            ));
        }

        self.records
            .lock()
            .expect("lock poisoned")
            .insert((collection.to_string(), key.to_string()), record.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub topic: String,
    pub key: String,
    pub payload: Value,
}

#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<PublishedEvent>>,
    failure: Option<String>,
}

impl RecordingEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self {
            events: Mutex::default(),
            failure: Some(reason.to_string()),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn events_on(&self, topic: &str) -> Vec<PublishedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.topic == topic)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &Value,
    ) -> Result<(), CollaboratorError> {
        if let Some(reason) = &self.failure {
            return Err(CollaboratorError::Unavailable(reason.clone()));
        }
        self.events
            .lock()
            .expect("lock poisoned")
            .push(PublishedEvent {
                topic: topic.to_string(),
                key: key.to_string(),
                payload: payload.clone(),
            });
        Ok(())
    }
}

#[derive(Default)]
pub struct MockEscalationGateway {
    escalations: Mutex<Vec<(String, Severity)>>,
    failure: Option<String>,
}

impl MockEscalationGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self {
            escalations: Mutex::default(),
            failure: Some(reason.to_string()),
        }
    }

    #[must_use]
    pub fn escalations(&self) -> Vec<(String, Severity)> {
        self.escalations.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl EscalationGateway for MockEscalationGateway {
    async fn escalate(
        &self,
        case_id: &str,
        severity: Severity,
    ) -> Result<String, CollaboratorError> {
        if let Some(reason) = &self.failure {
            return Err(CollaboratorError::Unavailable(reason.clone()));
        }
        let mut escalations = self.escalations.lock().expect("lock poisoned");
        escalations.push((case_id.to_string(), severity));
        Ok(format!("TICKET-MOCK-{}", escalations.len()))
    }
}
