use std::sync::Arc;

use async_trait::async_trait;
use casework_core::{ActionRecord, ActionType};
use casework_saga::{CompensationHandler, HandlerError, HandlerRegistry};
use serde_json::json;
use tracing::debug;

use crate::Result;
use crate::topics::COMPENSATION_COMMANDS;
use crate::traits::EventPublisher;

/// Reverses an action by publishing a reversal command for the owning system.
///
/// The command is keyed by the action's correlation id so the consumer can
/// deduplicate redeliveries.
pub struct OutboxCompensationHandler {
    action_type: ActionType,
    reversed_tag: String,
    correlation_key: Option<String>,
    publisher: Arc<dyn EventPublisher>,
}

impl OutboxCompensationHandler {
    pub fn new(
        action_type: ActionType,
        reversed_tag: impl Into<String>,
        correlation_key: Option<&str>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            action_type,
            reversed_tag: reversed_tag.into(),
            correlation_key: correlation_key.map(str::to_string),
            publisher,
        }
    }
}

#[async_trait]
impl CompensationHandler for OutboxCompensationHandler {
    fn reversed_tag(&self) -> &str {
        &self.reversed_tag
    }

    fn compensation_description(&self) -> String {
        format!(
            "publish {} command for {}",
            self.reversed_tag, self.action_type
        )
    }

    async fn compensate(&self, record: &ActionRecord) -> std::result::Result<(), HandlerError> {
        let correlation_id = match &self.correlation_key {
            Some(key) => HandlerError::require(record, key)?.to_string(),
            None => format!("{}-{}", self.action_type, record.sequence_index),
        };

        let command = json!({
            "command": self.reversed_tag,
            "actionType": record.action_type,
            "sequenceIndex": record.sequence_index,
            "correlationKey": self.correlation_key,
            "correlationId": correlation_id,
            "metadata": record.metadata,
        });

        self.publisher
            .publish(COMPENSATION_COMMANDS, &correlation_id, &command)
            .await
            .map_err(HandlerError::failed)?;

        debug!(
            action_type = %self.action_type,
            %correlation_id,
            "reversal command published"
        );
        Ok(())
    }
}

/// Registry with an outbox handler for every action type that has a known
/// reversal.
///
/// # Errors
///
/// Returns an error if a handler is rejected by the registry.
pub fn standard_registry(publisher: Arc<dyn EventPublisher>) -> Result<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    for action_type in ActionType::standard() {
        let Some(tag) = action_type.reversed_tag() else {
            continue;
        };
        let handler = OutboxCompensationHandler::new(
            action_type.clone(),
            tag,
            action_type.correlation_key(),
            Arc::clone(&publisher),
        );
        registry.register(action_type, handler)?;
    }
    Ok(registry)
}
