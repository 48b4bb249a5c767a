//! Per-run temporary extraction directory

use crate::error::{PostProcessError, Result};
use crate::naming::sanitize_name;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A freshly created, uniquely named directory under the temp root
///
/// The directory is not removed on drop; call
/// [`super::cleanup::remove_workspace`] once the run is finished.
#[derive(Debug)]
pub struct TemporaryWorkspace {
    path: PathBuf,
}

impl TemporaryWorkspace {
    /// Create `<temp_root>/<millis><name>-<pid>`
    ///
    /// The temp root is created if missing. The leaf must not exist yet, so
    /// two runs never share a workspace.
    pub async fn create(temp_root: &Path, output_name: &str) -> Result<Self> {
        let path = temp_root.join(workspace_name(output_name));

        tokio::fs::create_dir_all(temp_root)
            .await
            .map_err(|e| PostProcessError::WorkspaceFailed {
                path: temp_root.to_path_buf(),
                reason: e.to_string(),
            })?;
        tokio::fs::create_dir(&path)
            .await
            .map_err(|e| PostProcessError::WorkspaceFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        debug!(?path, "created temporary workspace");
        Ok(Self { path })
    }

    /// Location of the workspace
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Directory name for a workspace: millisecond timestamp, sanitized name, pid
pub fn workspace_name(output_name: &str) -> String {
    format!(
        "{}{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_name(output_name),
        std::process::id()
    )
}
