use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CollaboratorError;
use crate::providers::json_lines::append_line;
use crate::traits::EventPublisher;

/// Outbox publisher: every event becomes one JSON line that a relay forwards
/// to the message bus.
#[derive(Debug)]
pub struct JsonLinesEventPublisher {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesEventPublisher {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventPublisher for JsonLinesEventPublisher {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &Value,
    ) -> Result<(), CollaboratorError> {
        let line = json!({
            "topic": topic,
            "key": key,
            "payload": payload,
            "publishedAt": Utc::now(),
        });

        let _guard = self.write_lock.lock().await;
        append_line(&self.path, &line).await?;
        debug!(topic, key, "event appended to outbox");
        Ok(())
    }
}
