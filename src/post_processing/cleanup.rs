//! Workspace removal

use std::path::Path;
use tracing::{debug, info, warn};

/// Remove a workspace directory and everything in it
///
/// A missing directory is a no-op. Failures are logged and swallowed so they
/// never mask the outcome of the run.
pub(crate) async fn remove_workspace(path: &Path) {
    if tokio::fs::metadata(path).await.is_err() {
        debug!(?path, "workspace does not exist, nothing to clean up");
        return;
    }

    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => info!(?path, "removed temporary workspace"),
        Err(e) => warn!(?path, error = %e, "failed to remove temporary workspace"),
    }
}
