use std::path::Path;

use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::CollaboratorError;

/// Append `value` as one line to the file at `path`, creating the file and
/// its parent directories on first use.
pub(crate) async fn append_line(path: &Path, value: &Value) -> Result<(), CollaboratorError> {
    let io_error = |source| CollaboratorError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_error)?;
    file.write_all(&line).await.map_err(io_error)?;
    file.flush().await.map_err(io_error)?;
    Ok(())
}
