//! Archive handler trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Outcome of one extraction
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct ExtractOutcome {
    /// Files written into the destination
    pub extracted: Vec<PathBuf>,
    /// Members skipped because they were smaller than the size filter
    pub skipped_small: usize,
}

/// Trait for archive extraction and listing
///
/// Implementations can use an in-process library or an external binary.
/// Extraction must be quiet (no progress output on stdout) and must never
/// write outside `dest`.
///
/// # Examples
///
/// ```no_run
/// use tv_post::extraction::{ArchiveHandler, LibraryArchiveHandler};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handler = LibraryArchiveHandler;
/// let outcome = handler
///     .extract(Path::new("show.part01.rar"), Path::new("/tmp/work"), 60_000_000)
///     .await?;
/// println!("extracted {} file(s)", outcome.extracted.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ArchiveHandler: Send + Sync {
    /// Extract every member of at least `min_file_size` bytes into `dest`
    ///
    /// # Arguments
    ///
    /// * `archive` - The archive (first volume for multi-part sets)
    /// * `dest` - Existing destination directory
    /// * `min_file_size` - Members smaller than this are skipped
    async fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        min_file_size: u64,
    ) -> crate::Result<ExtractOutcome>;

    /// Human-readable listing of the archive members, one line per entry
    ///
    /// Only used for diagnostics when extraction yields no video.
    async fn list(&self, archive: &Path) -> crate::Result<Vec<String>>;

    /// Name of this handler implementation
    fn name(&self) -> &'static str;
}
