use crate::error::{Error, PostProcessError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::shared::format_member;
use super::traits::ExtractOutcome;

/// In-process ZIP extraction
pub struct ZipExtractor;

impl ZipExtractor {
    fn open(archive_path: &Path) -> Result<zip::ZipArchive<std::fs::File>> {
        let file = std::fs::File::open(archive_path).map_err(|e| {
            Error::PostProcess(PostProcessError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to open ZIP archive: {}", e),
            })
        })?;

        zip::ZipArchive::new(file).map_err(|e| {
            Error::PostProcess(PostProcessError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to read ZIP archive: {}", e),
            })
        })
    }

    /// Write a single ZIP member to disk, creating parent directories as needed
    fn extract_member(
        file: &mut zip::read::ZipFile,
        file_path: &Path,
        archive_path: &Path,
    ) -> Result<()> {
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = std::fs::File::create(file_path)?;
        std::io::copy(file, &mut outfile).map_err(|e| {
            Error::PostProcess(PostProcessError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to extract {}: {}", file_path.display(), e),
            })
        })?;
        Ok(())
    }

    /// Extract a ZIP archive, skipping members below `min_file_size`
    pub fn extract(
        archive_path: &Path,
        dest_path: &Path,
        min_file_size: u64,
    ) -> Result<ExtractOutcome> {
        debug!(?archive_path, ?dest_path, min_file_size, "starting ZIP extraction");

        std::fs::create_dir_all(dest_path)?;
        let mut archive = Self::open(archive_path)?;
        let mut outcome = ExtractOutcome::default();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| {
                Error::PostProcess(PostProcessError::ExtractionFailed {
                    archive: archive_path.to_path_buf(),
                    reason: format!("failed to read ZIP entry: {}", e),
                })
            })?;

            if file.is_dir() {
                continue;
            }

            let relative: PathBuf = match file.enclosed_name() {
                Some(path) => path.to_path_buf(),
                None => {
                    warn!(member = file.name(), "skipping entry with unsafe path");
                    continue;
                }
            };

            if file.size() < min_file_size {
                debug!(member = ?relative, size = file.size(), "skipping member below size filter");
                outcome.skipped_small += 1;
                continue;
            }

            let file_path = dest_path.join(&relative);
            Self::extract_member(&mut file, &file_path, archive_path)?;
            outcome.extracted.push(file_path);
        }

        info!(
            ?archive_path,
            extracted_count = outcome.extracted.len(),
            skipped_small = outcome.skipped_small,
            "ZIP extraction finished"
        );

        Ok(outcome)
    }

    /// List the members of a ZIP archive
    pub fn list(archive_path: &Path) -> Result<Vec<String>> {
        let mut archive = Self::open(archive_path)?;
        let mut lines = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index_raw(i).map_err(|e| {
                Error::PostProcess(PostProcessError::ExtractionFailed {
                    archive: archive_path.to_path_buf(),
                    reason: format!("failed to read ZIP entry: {}", e),
                })
            })?;
            lines.push(format_member(Path::new(file.name()), file.size(), file.is_dir()));
        }
        Ok(lines)
    }
}
