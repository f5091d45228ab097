use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CollaboratorError;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `payload` on `topic`, partitioned by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the event bus did not acknowledge the event.
    async fn publish(&self, topic: &str, key: &str, payload: &Value)
    -> Result<(), CollaboratorError>;
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &Value,
    ) -> Result<(), CollaboratorError> {
        (**self).publish(topic, key, payload).await
    }
}
