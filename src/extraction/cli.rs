//! Extraction through the external unrar binary

use super::traits::{ArchiveHandler, ExtractOutcome};
use crate::search;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Archive handler that runs the external `unrar` binary
///
/// Arguments are always passed as an explicit argv, never through a shell,
/// so archive and workspace paths may contain any characters.
///
/// # Examples
///
/// ```no_run
/// use tv_post::extraction::CliArchiveHandler;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let handler = CliArchiveHandler::new(PathBuf::from("/usr/bin/unrar"));
///
/// // Or auto-discover from PATH
/// let handler = CliArchiveHandler::from_path().expect("unrar not found in PATH");
/// ```
pub struct CliArchiveHandler {
    binary_path: PathBuf,
}

impl CliArchiveHandler {
    /// Create a new CLI handler with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find unrar in PATH
    pub fn from_path() -> Option<Self> {
        which::which("unrar").ok().map(Self::new)
    }

    /// Path of the binary this handler runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Arguments for a quiet extraction with a minimum member size
    ///
    /// `x` keeps archive paths, `-inul` silences output, `-sm<size>` selects
    /// members larger than the filter, `-y` answers prompts, `-o+` overwrites.
    pub fn extract_args(
        archive: &Path,
        dest: &Path,
        min_file_size: u64,
    ) -> Vec<std::ffi::OsString> {
        // A trailing separator tells unrar the destination is a directory.
        let mut dest_dir = dest.as_os_str().to_os_string();
        if !dest_dir.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) {
            dest_dir.push(std::path::MAIN_SEPARATOR_STR);
        }
        vec![
            "x".into(),
            "-inul".into(),
            "-y".into(),
            "-o+".into(),
            format!("-sm{}", min_file_size.saturating_sub(1)).into(),
            archive.as_os_str().to_os_string(),
            dest_dir,
        ]
    }

    /// Arguments for a technical listing
    pub fn list_args(archive: &Path) -> Vec<std::ffi::OsString> {
        vec!["l".into(), archive.as_os_str().to_os_string()]
    }
}

#[async_trait]
impl ArchiveHandler for CliArchiveHandler {
    async fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        min_file_size: u64,
    ) -> crate::Result<ExtractOutcome> {
        let args = Self::extract_args(archive, dest, min_file_size);
        debug!(binary = ?self.binary_path, ?args, "executing unrar");

        let output = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute unrar: {}", e)))?;

        if !output.status.success() {
            return Err(crate::Error::PostProcess(
                crate::error::PostProcessError::ExtractionFailed {
                    archive: archive.to_path_buf(),
                    reason: format!(
                        "unrar exited with {}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                },
            ));
        }

        // unrar does not report what it wrote, so take stock of the workspace.
        let extracted = search::find_all(dest, |_| true);
        info!(
            ?archive,
            extracted_count = extracted.len(),
            "unrar extraction finished"
        );

        Ok(ExtractOutcome {
            extracted,
            skipped_small: 0,
        })
    }

    async fn list(&self, archive: &Path) -> crate::Result<Vec<String>> {
        let output = Command::new(&self.binary_path)
            .args(Self::list_args(archive))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute unrar: {}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    fn name(&self) -> &'static str {
        "cli-unrar"
    }
}
