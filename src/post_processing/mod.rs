//! Post-processing pipeline for a resolved job
//!
//! Archive jobs run through every stage:
//! 1. Workspace - create a unique temporary directory
//! 2. Extract - unpack members above the size threshold
//! 3. Locate - pick the first video in the workspace
//! 4. Place - move or copy it into the ready directory
//! 5. Cleanup - remove the workspace (always attempted)
//!
//! Direct video jobs only run the placement stage.

use crate::config::Config;
use crate::error::{PostProcessError, Result};
use crate::extraction::ArchiveHandler;
use crate::search;
use crate::types::{Job, ResolvedInput, Stage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

mod cleanup;
mod placement;
mod workspace;

pub use workspace::{TemporaryWorkspace, workspace_name};

use cleanup::remove_workspace;
use placement::Placer;

/// Post-processing pipeline executor
pub struct PostProcessor {
    /// Extraction backend
    handler: Arc<dyn ArchiveHandler>,
    /// Placement settings
    config: Arc<Config>,
}

impl PostProcessor {
    /// Create a new post-processing pipeline executor
    pub fn new(handler: Arc<dyn ArchiveHandler>, config: Arc<Config>) -> Self {
        Self { handler, config }
    }

    /// Run the pipeline for `job`
    ///
    /// Returns the path the video was placed at (or would have been, in test
    /// mode).
    pub async fn run(&self, job: &Job) -> Result<PathBuf> {
        info!("----- Processing Start -----");
        info!(
            input = ?job.input,
            output_name = %job.output_name,
            transfer = ?job.transfer,
            handler = self.handler.name(),
            stage = %Stage::InputValidated,
            "starting post-processing pipeline"
        );
        if job.dry_run {
            info!("test mode enabled, files will not be transferred");
        }

        let placed = match &job.source {
            ResolvedInput::Video(video) => {
                info!(?video, "input is a video, skipping extraction");
                self.run_place_stage(job, video).await?
            }
            ResolvedInput::Archive(archive) => self.run_archive(job, archive).await?,
        };

        info!(destination = ?placed, stage = %Stage::Done, "----- Processing Complete -----");
        Ok(placed)
    }

    /// Extract into a fresh workspace, place the video, always clean up
    async fn run_archive(&self, job: &Job, archive: &Path) -> Result<PathBuf> {
        let workspace = TemporaryWorkspace::create(&job.temp_root, &job.output_name).await?;
        info!(workspace = ?workspace.path(), "extracting into temporary workspace");

        let result = self.extract_and_place(job, archive, workspace.path()).await;

        remove_workspace(workspace.path()).await;
        debug!(stage = %Stage::Cleaned, "cleanup stage complete");
        result
    }

    async fn extract_and_place(&self, job: &Job, archive: &Path, dest: &Path) -> Result<PathBuf> {
        let video = self.run_extract_stage(job, archive, dest).await?;
        self.run_place_stage(job, &video).await
    }

    /// Execute the extract stage and locate the video it produced
    async fn run_extract_stage(&self, job: &Job, archive: &Path, dest: &Path) -> Result<PathBuf> {
        debug!(?archive, ?dest, "running extract stage");

        match self.handler.extract(archive, dest, job.min_file_size).await {
            Ok(outcome) => {
                info!(
                    ?archive,
                    extracted_count = outcome.extracted.len(),
                    skipped_small = outcome.skipped_small,
                    "extraction finished"
                );
            }
            Err(e) => {
                error!(?archive, error = %e, "extraction failed");
                self.log_archive_listing(archive).await;
                return Err(e);
            }
        }

        match search::find_video(dest, &job.video_extensions) {
            Some(video) => {
                info!(?video, stage = %Stage::Extracted, "found extracted video");
                Ok(video)
            }
            None => {
                error!(
                    ?archive,
                    min_file_size = job.min_file_size,
                    "no video file found after extraction"
                );
                self.log_archive_listing(archive).await;
                Err(PostProcessError::NoVideoExtracted {
                    archive: archive.to_path_buf(),
                }
                .into())
            }
        }
    }

    /// Dump the archive contents so a failed run can be diagnosed from the log
    async fn log_archive_listing(&self, archive: &Path) {
        match self.handler.list(archive).await {
            Ok(lines) => {
                info!(?archive, "archive listing:");
                for line in lines {
                    info!("{}", line);
                }
            }
            Err(e) => warn!(?archive, error = %e, "failed to list archive contents"),
        }
    }

    /// Execute the place stage
    async fn run_place_stage(&self, job: &Job, video: &Path) -> Result<PathBuf> {
        let dest = job.destination_for(video);
        debug!(?video, ?dest, "running place stage");

        let placed = Placer::new(&self.config.placement)
            .place(video, &dest, job.transfer, job.dry_run)
            .await?;

        info!(?placed, stage = %Stage::Placed, "video placed");
        Ok(placed)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
