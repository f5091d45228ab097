use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CollaboratorError;

/// Durable store for audit history.
///
/// Persistence is at-least-once: the same `(collection, key)` may be written
/// more than once and the last write wins.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the record could not be stored.
    async fn persist(
        &self,
        collection: &str,
        key: &str,
        record: &Value,
    ) -> Result<(), CollaboratorError>;
}

#[async_trait]
impl<T: AuditRecorder + ?Sized> AuditRecorder for Arc<T> {
    async fn persist(
        &self,
        collection: &str,
        key: &str,
        record: &Value,
    ) -> Result<(), CollaboratorError> {
        (**self).persist(collection, key, record).await
    }
}
