//! Archive extraction with a minimum member size
//!
//! Two interchangeable [`ArchiveHandler`] implementations are provided:
//! [`LibraryArchiveHandler`] extracts in-process (RAR through the unrar
//! library, ZIP through the zip crate) and [`CliArchiveHandler`] runs the
//! external `unrar` binary. [`create_handler`] picks one from configuration.

mod cli;
mod rar;
mod shared;
mod traits;
mod zip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

// Re-exports
pub use cli::CliArchiveHandler;
pub use rar::RarExtractor;
pub use shared::{detect_archive_type, sanitize_member_path};
pub use traits::{ArchiveHandler, ExtractOutcome};
pub use zip::ZipExtractor;

use crate::config::ToolsConfig;
use crate::error::{Error, PostProcessError, Result};
use crate::types::ArchiveType;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

/// In-process archive handler
///
/// Detects the archive type from the extension and routes to
/// [`RarExtractor`] or [`ZipExtractor`] on the blocking thread pool.
pub struct LibraryArchiveHandler;

impl LibraryArchiveHandler {
    fn archive_type(archive: &Path) -> Result<ArchiveType> {
        detect_archive_type(archive).ok_or_else(|| {
            Error::PostProcess(PostProcessError::UnsupportedArchive {
                archive: archive.to_path_buf(),
            })
        })
    }

    /// Run a blocking archive operation without stalling the runtime
    async fn run_blocking<T, F>(archive: &Path, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        spawn_blocking(op).await.map_err(|e| {
            Error::PostProcess(PostProcessError::ExtractionFailed {
                archive: archive.to_path_buf(),
                reason: format!("extraction task panicked: {}", e),
            })
        })?
    }
}

#[async_trait]
impl ArchiveHandler for LibraryArchiveHandler {
    async fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        min_file_size: u64,
    ) -> Result<ExtractOutcome> {
        let archive_type = Self::archive_type(archive)?;
        info!(
            ?archive,
            ?archive_type,
            "dispatching extraction to appropriate extractor"
        );

        let archive_owned = archive.to_path_buf();
        let dest_owned = dest.to_path_buf();
        Self::run_blocking(archive, move || match archive_type {
            ArchiveType::Rar => RarExtractor::extract(&archive_owned, &dest_owned, min_file_size),
            ArchiveType::Zip => ZipExtractor::extract(&archive_owned, &dest_owned, min_file_size),
        })
        .await
    }

    async fn list(&self, archive: &Path) -> Result<Vec<String>> {
        let archive_type = Self::archive_type(archive)?;
        let archive_owned = archive.to_path_buf();
        Self::run_blocking(archive, move || match archive_type {
            ArchiveType::Rar => RarExtractor::list(&archive_owned),
            ArchiveType::Zip => ZipExtractor::list(&archive_owned),
        })
        .await
    }

    fn name(&self) -> &'static str {
        "library"
    }
}

/// Build the archive handler selected by the tools configuration
///
/// The CLI handler uses `unrar_path` when set, otherwise searches `PATH`
/// (if allowed). Asking for the CLI without a usable binary is a
/// configuration error.
pub fn create_handler(tools: &ToolsConfig) -> Result<Arc<dyn ArchiveHandler>> {
    if !tools.use_unrar_cli {
        debug!("using in-process archive extraction");
        return Ok(Arc::new(LibraryArchiveHandler));
    }

    let binary: Option<PathBuf> = match &tools.unrar_path {
        Some(path) => Some(path.clone()),
        None if tools.search_path => {
            CliArchiveHandler::from_path().map(|h| h.binary_path().to_path_buf())
        }
        None => None,
    };

    match binary {
        Some(path) if path.is_file() => {
            info!(binary = ?path, "using external unrar binary");
            Ok(Arc::new(CliArchiveHandler::new(path)))
        }
        Some(path) => Err(Error::config(
            format!("unrar binary {} does not exist", path.display()),
            "unrar_path",
        )),
        None => Err(Error::config(
            "unrar binary requested but not found in PATH",
            "unrar_path",
        )),
    }
}
