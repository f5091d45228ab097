use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::error::CollaboratorError;
use crate::traits::AuditRecorder;

/// Stores each record as `<root>/<collection>/<key>.json`.
///
/// Records are written to a temporary file and renamed into place, so a
/// record is either fully present or absent.
#[derive(Debug, Clone)]
pub struct FileSystemAuditRecorder {
    root: PathBuf,
}

impl FileSystemAuditRecorder {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn record_path(&self, collection: &str, key: &str) -> PathBuf {
        self.root.join(collection).join(format!("{key}.json"))
    }
}

fn validate_segment(segment: &str) -> Result<(), CollaboratorError> {
    let invalid = segment.is_empty()
        || segment.starts_with('.')
        || segment.contains(['/', '\\'])
        || segment.chars().any(char::is_control);
    if invalid {
        return Err(CollaboratorError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

#[async_trait]
impl AuditRecorder for FileSystemAuditRecorder {
    async fn persist(
        &self,
        collection: &str,
        key: &str,
        record: &Value,
    ) -> Result<(), CollaboratorError> {
        validate_segment(collection)?;
        validate_segment(key)?;

        let dir = self.root.join(collection);
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| CollaboratorError::Io {
                path: dir.clone(),
                source,
            })?;

        let target = self.record_path(collection, key);
        let staging = dir.join(format!(".{key}.json.tmp"));
        let content = serde_json::to_vec_pretty(record)?;

        fs::write(&staging, content)
            .await
            .map_err(|source| CollaboratorError::Io {
                path: staging.clone(),
                source,
            })?;
        fs::rename(&staging, &target)
            .await
            .map_err(|source| CollaboratorError::Io {
                path: target.clone(),
                source,
            })?;

        debug!(collection, key, path = %target.display(), "audit record persisted");
        Ok(())
    }
}
