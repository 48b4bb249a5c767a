use crate::error::{Error, PostProcessError, Result};
use std::path::Path;
use tracing::{debug, info};

use super::shared::{format_member, sanitize_member_path};
use super::traits::ExtractOutcome;

/// In-process RAR extraction through the unrar library
pub struct RarExtractor;

impl RarExtractor {
    fn extraction_failed(archive_path: &Path, reason: impl Into<String>) -> Error {
        Error::PostProcess(PostProcessError::ExtractionFailed {
            archive: archive_path.to_path_buf(),
            reason: reason.into(),
        })
    }

    /// Extract a RAR archive, skipping members below `min_file_size`
    ///
    /// Multi-volume sets are followed automatically when `archive_path` is
    /// the first volume.
    pub fn extract(
        archive_path: &Path,
        dest_path: &Path,
        min_file_size: u64,
    ) -> Result<ExtractOutcome> {
        debug!(?archive_path, ?dest_path, min_file_size, "starting RAR extraction");

        std::fs::create_dir_all(dest_path)?;

        let mut at_header = unrar::Archive::new(archive_path)
            .open_for_processing()
            .map_err(|e| Self::extraction_failed(archive_path, e.to_string()))?;

        let mut outcome = ExtractOutcome::default();

        loop {
            let at_file = match at_header.read_header() {
                Ok(Some(entry_processor)) => entry_processor,
                Ok(None) => break,
                Err(e) => return Err(Self::extraction_failed(archive_path, e.to_string())),
            };

            let header = at_file.entry();
            let size = header.unpacked_size;
            let sanitized = sanitize_member_path(&header.filename);
            let wanted = !header.is_directory() && !sanitized.as_os_str().is_empty();

            if wanted && size < min_file_size {
                debug!(member = ?sanitized, size, "skipping member below size filter");
                outcome.skipped_small += 1;
            }

            at_header = if wanted && size >= min_file_size {
                let file_path = dest_path.join(&sanitized);
                if let Some(parent) = file_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let next = at_file
                    .extract_to(&file_path)
                    .map_err(|e| Self::extraction_failed(archive_path, e.to_string()))?;
                outcome.extracted.push(file_path);
                next
            } else {
                at_file.skip().map_err(|e| {
                    Self::extraction_failed(archive_path, format!("failed to skip entry: {}", e))
                })?
            };
        }

        info!(
            ?archive_path,
            extracted_count = outcome.extracted.len(),
            skipped_small = outcome.skipped_small,
            "RAR extraction finished"
        );

        Ok(outcome)
    }

    /// List the members of a RAR archive
    pub fn list(archive_path: &Path) -> Result<Vec<String>> {
        let listing = unrar::Archive::new(archive_path)
            .open_for_listing()
            .map_err(|e| Self::extraction_failed(archive_path, e.to_string()))?;

        let mut lines = Vec::new();
        for entry in listing {
            let header = entry.map_err(|e| Self::extraction_failed(archive_path, e.to_string()))?;
            lines.push(format_member(
                &header.filename,
                header.unpacked_size,
                header.is_directory(),
            ));
        }
        Ok(lines)
    }
}
